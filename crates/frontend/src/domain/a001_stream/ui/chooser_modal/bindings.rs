//! Binds a [`SearchSession`] to the markup of one `chooser` step.
//!
//! Every `chooser` step builds a fresh binding. It lives as long as the
//! listeners it attached, i.e. until the modal body is replaced.

use super::model;
use super::session::{Filters, RequestToken, ResponseOutcome, SearchSession, SessionCommand};
use super::upload::{self, TitleFieldErrors, UploadCheck, UploadErrorPanel};
use crate::shared::config::{config, ChooserConfig};
use crate::shared::dom;
use crate::shared::modal_workflow::ModalWorkflow;
use crate::shared::tabs::init_tabs;
use contracts::usecases::u001_stream_chooser::request::{Ordering, SearchQuery};
use contracts::usecases::u001_stream_chooser::response::{ChooserStepData, ModalStep};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    AbortController, Element, FormData, HtmlAnchorElement, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement,
};

pub struct ChooserStepBinding {
    modal: ModalWorkflow,
    body: Element,
    config: ChooserConfig,
    step_data: ChooserStepData,
    search_url: String,
    results: Option<Element>,
    search_input: Option<HtmlInputElement>,
    collection: Option<Element>,
    initial_results_html: String,
    session: RefCell<SearchSession>,
    in_flight: RefCell<Option<AbortController>>,
    debounce: RefCell<Option<Timeout>>,
}

fn field_value(el: &Element) -> String {
    if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        return select.value();
    }
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    String::new()
}

impl ChooserStepBinding {
    pub fn attach(modal: ModalWorkflow, body: &HtmlElement, step: &ModalStep) -> Rc<Self> {
        let config = config();
        let body: Element = body.clone().unchecked_into();
        let step_data = step.data_as::<ChooserStepData>().unwrap_or_else(|e| {
            log::warn!("chooser step data: {}, using defaults", e);
            ChooserStepData::default()
        });

        let search_url = dom::query(&body, &config.search_form_selector)
            .and_then(|form| form.get_attribute("action"))
            .unwrap_or_default();
        let results = dom::query(&body, &config.results_selector);
        let initial_results_html = results.as_ref().map(Element::inner_html).unwrap_or_default();

        let binding = Rc::new(Self {
            modal,
            search_input: dom::query_as(&body, &config.search_input_selector),
            collection: dom::query(&body, &config.collection_selector),
            session: RefCell::new(SearchSession::new(config.search_debounce_ms)),
            in_flight: RefCell::new(None),
            debounce: RefCell::new(None),
            body,
            config,
            step_data,
            search_url,
            results,
            initial_results_html,
        });

        binding.ajaxify_links(&binding.body);
        init_tabs(&binding.body, binding.config.tab_transition_ms);
        binding.bind_search();
        binding.bind_upload();
        binding.bind_file_inputs();
        binding.bind_tag_inputs();
        binding
    }

    fn filter_values(&self) -> (String, String) {
        let text = self.search_input.as_ref().map(HtmlInputElement::value).unwrap_or_default();
        let collection = self.collection.as_ref().map(field_value).unwrap_or_default();
        (text, collection)
    }

    fn search(self: &Rc<Self>) {
        let (text, collection) = self.filter_values();
        let commands = self.session.borrow_mut().search(Filters::new(&text, &collection));
        self.run(commands);
    }

    fn run(self: &Rc<Self>, commands: Vec<SessionCommand>) {
        for command in commands {
            match command {
                SessionCommand::Cancel(_) => {
                    if let Some(controller) = self.in_flight.borrow_mut().take() {
                        controller.abort();
                    }
                }
                SessionCommand::Fetch { token, query } => self.fetch(token, query),
                SessionCommand::RestoreInitial => self.render_results(&self.initial_results_html),
                SessionCommand::ScheduleSearch {
                    generation,
                    delay_ms,
                } => {
                    let this = Rc::clone(self);
                    let timer = Timeout::new(delay_ms, move || {
                        let (text, collection) = this.filter_values();
                        let commands = this
                            .session
                            .borrow_mut()
                            .on_debounce_elapsed(generation, Filters::new(&text, &collection));
                        this.run(commands);
                    });
                    // Single slot: the replaced timer is cancelled on drop.
                    *self.debounce.borrow_mut() = Some(timer);
                }
                SessionCommand::ClearSearchInput => {
                    if let Some(input) = &self.search_input {
                        input.set_value("");
                    }
                }
            }
        }
    }

    fn fetch(self: &Rc<Self>, token: RequestToken, query: SearchQuery) {
        let controller = AbortController::new().ok();
        let signal = controller.as_ref().map(AbortController::signal);
        *self.in_flight.borrow_mut() = controller;

        let this = Rc::clone(self);
        spawn_local(async move {
            let result = model::fetch_results(&this.search_url, &query, signal.as_ref()).await;
            let outcome = this.session.borrow_mut().on_response(token, result);
            match outcome {
                ResponseOutcome::Render(html) => {
                    *this.in_flight.borrow_mut() = None;
                    this.render_results(&html);
                }
                ResponseOutcome::Failed(e) => {
                    *this.in_flight.borrow_mut() = None;
                    if !e.is_aborted() {
                        log::error!("Stream search failed: {}", e);
                    }
                }
                ResponseOutcome::Discarded => {}
            }
        });
    }

    fn render_results(self: &Rc<Self>, html: &str) {
        let Some(results) = &self.results else {
            return;
        };
        results.set_inner_html(html);
        self.ajaxify_links(results);
    }

    /// Intercept selection, paging and ordering links under `root`.
    fn ajaxify_links(self: &Rc<Self>, root: &Element) {
        for link in dom::query_all(root, "a.stream-choice") {
            if !dom::bind_once(&link, "stream-choice") {
                continue;
            }
            let modal = self.modal;
            dom::listen(&link, "click", move |e| {
                e.prevent_default();
                let anchor = dom::current_element(&e)
                    .and_then(|el| el.dyn_into::<HtmlAnchorElement>().ok());
                if let Some(anchor) = anchor {
                    modal.load_url(&anchor.href());
                }
            });
        }

        for link in dom::query_all(root, ".pagination a[data-page]") {
            if !dom::bind_once(&link, "page") {
                continue;
            }
            let this = Rc::clone(self);
            dom::listen(&link, "click", move |e| {
                e.prevent_default();
                let page = dom::current_element(&e)
                    .and_then(|el| el.get_attribute("data-page"))
                    .and_then(|p| p.trim().parse::<u32>().ok());
                let Some(page) = page else {
                    return;
                };
                let (text, collection) = this.filter_values();
                let commands = this
                    .session
                    .borrow_mut()
                    .on_page(page, Filters::new(&text, &collection));
                this.run(commands);
            });
        }

        for link in dom::query_all(root, "a[data-ordering]") {
            if !dom::bind_once(&link, "ordering") {
                continue;
            }
            let this = Rc::clone(self);
            dom::listen(&link, "click", move |e| {
                e.prevent_default();
                let ordering = dom::current_element(&e)
                    .and_then(|el| el.get_attribute("data-ordering"))
                    .map(|o| Ordering::parse(&o))
                    .unwrap_or_default();
                let (text, collection) = this.filter_values();
                let commands = this
                    .session
                    .borrow_mut()
                    .on_ordering(ordering, Filters::new(&text, &collection));
                this.run(commands);
            });
        }
    }

    fn bind_search(self: &Rc<Self>) {
        if let Some(form) = dom::query(&self.body, &self.config.search_form_selector) {
            if dom::bind_once(&form, "search") {
                let this = Rc::clone(self);
                dom::listen(&form, "submit", move |e| {
                    e.prevent_default();
                    this.search();
                });
            }
        }

        if let Some(input) = &self.search_input {
            if dom::bind_once(input, "search-input") {
                let this = Rc::clone(self);
                dom::listen(input, "input", move |_| {
                    let commands = this.session.borrow_mut().on_input();
                    this.run(commands);
                });
            }
        }

        if let Some(collection) = &self.collection {
            if dom::bind_once(collection, "collection") {
                let this = Rc::clone(self);
                dom::listen(collection, "change", move |_| this.search());
            }
        }

        for chip in dom::query_all(&self.body, "a.suggested-tag") {
            if !dom::bind_once(&chip, "suggested-tag") {
                continue;
            }
            let this = Rc::clone(self);
            dom::listen(&chip, "click", move |e| {
                e.prevent_default();
                let tag = dom::current_element(&e)
                    .and_then(|el| el.text_content())
                    .unwrap_or_default();
                let (_, collection) = this.filter_values();
                let commands = this.session.borrow_mut().on_tag(&tag, &collection);
                this.run(commands);
            });
        }
    }

    fn bind_upload(self: &Rc<Self>) {
        let Some(form) = dom::query_as::<HtmlFormElement>(&self.body, &self.config.upload_form_selector)
        else {
            return;
        };
        if !dom::bind_once(&form, "upload") {
            return;
        }
        let this = Rc::clone(self);
        let target = form.clone();
        dom::listen(&form, "submit", move |e| {
            e.prevent_default();
            this.submit_upload(&target);
        });
    }

    fn submit_upload(self: &Rc<Self>, form: &HtmlFormElement) {
        let title_input = dom::query_as::<HtmlInputElement>(form, &self.config.upload_title_selector);
        let title = title_input.as_ref().map(HtmlInputElement::value);
        let shown = title_input.as_ref().map(title_field_errors).unwrap_or_default();

        match upload::check_title(title.as_deref(), shown) {
            UploadCheck::Reject {
                mark_field,
                append_message,
            } => {
                let Some(input) = &title_input else {
                    return;
                };
                if mark_field {
                    mark_required(input);
                }
                if append_message {
                    append_required_message(input, &self.config.required_field_message);
                }
            }
            UploadCheck::Submit => {
                let form_data = match FormData::new_with_form(form) {
                    Ok(form_data) => form_data,
                    Err(e) => {
                        log::error!("upload form data: {:?}", e);
                        return;
                    }
                };
                let action = form.action();
                let this = Rc::clone(self);
                spawn_local(async move {
                    let result = model::upload_stream(&action, form_data).await;
                    match result {
                        Ok(text) => {
                            if let Err(e) = this.modal.load_response_text(&text) {
                                log::error!("upload response: {}", e);
                                this.show_upload_error(&e.to_string());
                            }
                        }
                        Err(e) => this.show_upload_error(&e.to_string()),
                    }
                });
            }
        }
    }

    fn show_upload_error(&self, detail: &str) {
        let panel = UploadErrorPanel::new(&self.step_data, detail);
        let Some(container) = dom::query(&self.body, &self.config.upload_error_container) else {
            log::error!("upload failed: {}", detail);
            return;
        };
        if let Err(e) = append_error_panel(&container, &panel) {
            log::error!("upload error panel: {:?}", e);
        }
    }

    fn bind_file_inputs(&self) {
        let selector = format!("[name=\"{}\"]", self.config.upload_file_name);
        for input in dom::query_all(&self.body, &selector) {
            if !dom::bind_once(&input, "file-title") {
                continue;
            }
            let title_selector = self.config.upload_title_selector.clone();
            dom::listen(&input, "change", move |e| {
                let Some(file_input) = dom::current_element(&e)
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                let Some(form) = file_input.closest("form").ok().flatten() else {
                    return;
                };
                let Some(title) = dom::query_as::<HtmlInputElement>(&form, &title_selector) else {
                    return;
                };
                if title.value().trim().is_empty() {
                    title.set_value(&upload::title_from_file_path(&file_input.value()));
                }
            });
        }
    }

    /// Hand the autocomplete endpoint to the tag-entry behavior.
    fn bind_tag_inputs(&self) {
        let Some(url) = &self.step_data.tag_autocomplete_url else {
            return;
        };
        let selector = format!("[name=\"{}\"]", self.config.upload_tags_name);
        for input in dom::query_all(&self.body, &selector) {
            let _ = input.set_attribute("data-autocomplete-url", url);
        }
    }
}

fn field_errors_of(input: &HtmlInputElement) -> Option<(Element, Element)> {
    let field = input.closest("[data-field]").ok().flatten()?;
    let errors = dom::query(&field, "[data-field-errors]")?;
    Some((field, errors))
}

fn title_field_errors(input: &HtmlInputElement) -> TitleFieldErrors {
    TitleFieldErrors {
        invalid: input.has_attribute("aria-invalid"),
        message_shown: field_errors_of(input)
            .is_some_and(|(_, errors)| dom::query(&errors, ".error-message").is_some()),
    }
}

fn mark_required(input: &HtmlInputElement) {
    let _ = input.set_attribute("aria-invalid", "true");
    let Some((field, errors)) = field_errors_of(input) else {
        return;
    };
    dom::add_class(&field, "w-field--error");
    if let Some(icon) = dom::query(&errors, ".icon") {
        let _ = icon.remove_attribute("hidden");
    }
}

fn append_required_message(input: &HtmlInputElement, message: &str) {
    let Some((_, errors)) = field_errors_of(input) else {
        return;
    };
    let Some(document) = dom::document() else {
        return;
    };
    if let Ok(p) = document.create_element("p") {
        dom::add_class(&p, "error-message");
        p.set_text_content(Some(message));
        let _ = errors.append_child(&p);
    }
}

fn append_error_panel(container: &Element, panel: &UploadErrorPanel) -> Result<(), wasm_bindgen::JsValue> {
    let document = dom::document().ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;

    let block = document.create_element("div")?;
    block.set_class_name("help-block help-critical");

    let strong = document.create_element("strong")?;
    strong.set_text_content(Some(&panel.heading()));
    block.append_child(&strong)?;
    block.append_child(&document.create_text_node(&panel.message))?;
    let br = document.create_element("br")?;
    block.append_child(&br)?;
    block.append_child(&document.create_text_node(&panel.detail))?;

    container.append_child(&block)?;
    Ok(())
}
