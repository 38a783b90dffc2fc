use super::state::{truncate_label, ChooserState, ChooserView};
use crate::domain::a001_stream::ui::chooser_modal;
use crate::shared::dom;
use crate::shared::modal_workflow::{ModalWorkflow, ModalWorkflowConfig, ResponseCallbacks};
use crate::shared::widget_registry::BoundWidget;
use contracts::domain::a001_stream::aggregate::ChosenStream;
use contracts::usecases::u001_stream_chooser::response::RESPONSE_STREAM_CHOSEN;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

const BLANK_CLASS: &str = "blank";
const HIDDEN_CLASS: &str = "w-hidden";

/// Stream chooser bound to the server-rendered `#{id}-chooser` markup.
///
/// The choose affordance opens the chooser modal; the `streamChosen`
/// response updates the hidden input, the label and the edit link.
#[derive(Clone)]
pub struct StreamChooserWidget {
    inner: Rc<Inner>,
}

struct Inner {
    root: Element,
    input: HtmlInputElement,
    title: Option<Element>,
    choose: Option<HtmlElement>,
    clear: Option<Element>,
    edit: Option<Element>,
    state: RefCell<ChooserState>,
}

impl StreamChooserWidget {
    /// Bind the chooser for the field `id`. `None` when its root or input is missing.
    pub fn bind(id: &str) -> Option<Self> {
        let document = dom::document()?;
        let root = document.get_element_by_id(&format!("{}-chooser", id))?;
        let input = document
            .get_element_by_id(id)?
            .dyn_into::<HtmlInputElement>()
            .ok()?;

        let widget = Self {
            inner: Rc::new(Inner {
                title: dom::query(&root, "[data-chooser-title]"),
                choose: dom::query_first(&root, &[".action-choose", "[data-chooser-action-choose]"])
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
                clear: dom::query_first(&root, &[".action-clear", "[data-chooser-action-clear]"]),
                edit: dom::query_first(&root, &[".edit-link", "[data-chooser-edit-link]"]),
                state: RefCell::new(ChooserState::new()),
                root,
                input,
            }),
        };
        widget.bind_actions();
        Some(widget)
    }

    fn bind_actions(&self) {
        if let Some(choose) = &self.inner.choose {
            if dom::bind_once(choose, "chooser-choose") {
                let this = self.clone();
                dom::listen(choose, "click", move |_| this.open());
            }
        }
        if let Some(clear) = &self.inner.clear {
            if dom::bind_once(clear, "chooser-clear") {
                let this = self.clone();
                dom::listen(clear, "click", move |_| this.clear());
            }
        }
    }

    /// Open the chooser modal at the root's `data-chooser-url`.
    pub fn open(&self) {
        let url = self
            .inner
            .root
            .get_attribute("data-chooser-url")
            .unwrap_or_default();
        let this = self.clone();
        let responses = ResponseCallbacks::new().on(RESPONSE_STREAM_CHOSEN, move |payload| {
            match serde_json::from_value::<ChosenStream>(payload.clone()) {
                Ok(item) => this.on_item_chosen(item),
                Err(e) => log::error!("invalid streamChosen payload: {}", e),
            }
        });

        let opened = ModalWorkflow::open(ModalWorkflowConfig {
            url,
            on_load: chooser_modal::step_handlers(),
            responses,
        });
        if let Err(e) = opened {
            log::error!("stream chooser: {}", e);
        }
    }

    pub fn on_item_chosen(&self, item: ChosenStream) {
        let view = {
            let mut state = self.inner.state.borrow_mut();
            state.choose(item);
            state.view()
        };
        self.render(&view);
    }

    /// Empty the input and show the blank look; only with a clear affordance.
    pub fn clear(&self) {
        if self.inner.clear.is_none() {
            return;
        }
        let view = {
            let mut state = self.inner.state.borrow_mut();
            state.clear();
            state.view()
        };
        self.render(&view);
    }

    pub fn set_state(&self, item: Option<ChosenStream>) {
        let mut state = self.inner.state.borrow_mut();
        if state.set_state(item) {
            let view = state.view();
            drop(state);
            self.render(&view);
        }
    }

    pub fn state(&self) -> Option<ChosenStream> {
        self.inner.state.borrow().item().cloned()
    }

    fn render(&self, view: &ChooserView) {
        let inner = &self.inner;
        inner.input.set_value(&view.input_value);
        if let (Some(title), Some(label)) = (&inner.title, &view.label) {
            title.set_text_content(Some(label));
        }
        if let (Some(edit), Some(url)) = (&inner.edit, &view.edit_url) {
            let _ = edit.set_attribute("href", url);
            dom::remove_class(edit, HIDDEN_CLASS);
        }
        if view.blank {
            dom::add_class(&inner.root, BLANK_CLASS);
        } else {
            dom::remove_class(&inner.root, BLANK_CLASS);
        }
    }
}

impl BoundWidget for StreamChooserWidget {
    fn get_value(&self) -> Option<String> {
        self.inner.state.borrow().value()
    }

    fn get_state(&self) -> Value {
        self.state()
            .and_then(|item| serde_json::to_value(item).ok())
            .unwrap_or(Value::Null)
    }

    fn set_state(&self, state: &Value) {
        if state.is_null() {
            return;
        }
        match serde_json::from_value::<ChosenStream>(state.clone()) {
            Ok(item) => StreamChooserWidget::set_state(self, Some(item)),
            Err(e) => log::warn!("stream chooser: ignoring state: {}", e),
        }
    }

    fn get_text_label(&self, max_length: Option<usize>) -> String {
        let text = self
            .inner
            .title
            .as_ref()
            .and_then(|t| t.text_content())
            .unwrap_or_default();
        truncate_label(&text, max_length)
    }

    fn focus(&self) {
        if let Some(choose) = &self.inner.choose {
            let _ = choose.focus();
        }
    }
}
