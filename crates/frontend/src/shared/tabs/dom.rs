use super::controller::{TabController, TabEffect, TabOptions, TabSpec};
use crate::shared::dom;
use crate::shared::event_bus;
use gloo_timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys::{CustomEvent, CustomEventInit, Element, HtmlElement, KeyboardEvent, PopStateEvent};

const ANIMATE_CLASS: &str = "animate-in";

/// History entry state written on every tab switch.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryTabState {
    #[serde(rename = "tabContent")]
    tab_content: String,
}

#[derive(Serialize)]
struct SwitchDetail<'a> {
    tab: &'a str,
}

/// Tab behavior bound to one `[data-wm-tabs]` container.
pub struct TabsBinding {
    container: Element,
    tab_list: Option<Element>,
    buttons: Vec<HtmlElement>,
    controller: RefCell<TabController>,
}

fn history_tab() -> Option<String> {
    let state = web_sys::window()?.history().ok()?.state().ok()?;
    if state.is_null() || state.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value::<HistoryTabState>(state)
        .ok()
        .map(|s| s.tab_content)
}

fn location_hash() -> String {
    let raw = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw)
}

fn href_id(el: &Element) -> String {
    el.get_attribute("href")
        .unwrap_or_default()
        .trim_start_matches('#')
        .to_string()
}

impl TabsBinding {
    /// Bind a container; `None` when it has no tab buttons.
    pub fn attach(container: Element, transition_ms: u32) -> Option<Rc<Self>> {
        let buttons: Vec<HtmlElement> = dom::query_all(&container, "[role=\"tab\"]")
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();
        if buttons.is_empty() {
            return None;
        }

        let options = TabOptions {
            animate: container.has_attribute("data-tabs-animate"),
            disable_url: container.has_attribute("data-tabs-disable-url"),
            transition_ms,
        };

        for link in buttons
            .iter()
            .map(|b| b.clone().unchecked_into::<Element>())
            .chain(dom::query_all(&container, "[data-tab-trigger]"))
        {
            let _ = link.set_attribute("aria-controls", &href_id(&link));
        }

        let specs = buttons
            .iter()
            .map(|b| {
                let id = href_id(b);
                TabSpec {
                    has_panel: panel_in(&container, &id).is_some(),
                    preselected: b.get_attribute("aria-selected").as_deref() == Some("true"),
                    id,
                }
            })
            .collect();

        let binding = Rc::new(Self {
            tab_list: dom::query(&container, "[role=\"tablist\"]"),
            container,
            buttons,
            controller: RefCell::new(TabController::new(specs, options)),
        });
        binding.bind_events();

        let effects = binding
            .controller
            .borrow_mut()
            .initialize(&location_hash(), history_tab().as_deref());
        binding.apply(effects);

        Some(binding)
    }

    fn bind_events(self: &Rc<Self>) {
        for (index, button) in self.buttons.iter().enumerate() {
            if !dom::bind_once(button, "tab") {
                continue;
            }
            let this = Rc::clone(self);
            dom::listen(button, "click", move |e| {
                e.prevent_default();
                let effects = this.controller.borrow_mut().select(index, history_tab().as_deref());
                this.apply(effects);
            });

            let this = Rc::clone(self);
            dom::listen(button, "keydown", move |e| {
                let Some(key_event) = e.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let outcome = this
                    .controller
                    .borrow_mut()
                    .on_key(index, &key_event.key(), history_tab().as_deref());
                if outcome.prevent_default {
                    e.prevent_default();
                }
                this.apply(outcome.effects);
            });
        }

        watch_pop_state(self);

        for trigger in dom::query_all(&self.container, "[data-tab-trigger]") {
            if !dom::bind_once(&trigger, "tab-trigger") {
                continue;
            }
            let this = Rc::clone(self);
            let href = trigger.get_attribute("href").unwrap_or_default();
            dom::listen(&trigger, "click", move |e| {
                e.prevent_default();
                let effects = this
                    .controller
                    .borrow_mut()
                    .on_trigger(&href, history_tab().as_deref());
                this.apply(effects);
            });
        }
    }

    fn panel(&self, id: &str) -> Option<HtmlElement> {
        panel_in(&self.container, id)
    }

    fn apply(&self, effects: Vec<TabEffect>) {
        for effect in effects {
            match effect {
                TabEffect::SetSelected { tab, selected } => {
                    if let Some(button) = self.buttons.get(tab) {
                        let _ = button.set_attribute("aria-selected", if selected { "true" } else { "false" });
                        if selected {
                            let _ = button.remove_attribute("tabindex");
                        } else {
                            let _ = button.set_attribute("tabindex", "-1");
                        }
                    }
                }
                TabEffect::HideAllPanels => {
                    for panel in dom::query_all(&self.container, "[role=\"tabpanel\"]") {
                        if let Some(panel) = panel.dyn_ref::<HtmlElement>() {
                            panel.set_hidden(true);
                        }
                    }
                }
                TabEffect::ShowPanel { panel, delay_ms } => {
                    if let Some(panel) = self.panel(&panel) {
                        later(delay_ms, move || panel.set_hidden(false));
                    }
                }
                TabEffect::HidePanel { panel, delay_ms } => {
                    if let Some(panel) = self.panel(&panel) {
                        later(delay_ms, move || panel.set_hidden(true));
                    }
                }
                TabEffect::AddAnimateClass { panel, delay_ms } => {
                    if let Some(panel) = self.panel(&panel) {
                        later(delay_ms, move || dom::add_class(&panel, ANIMATE_CLASS));
                    }
                }
                TabEffect::RemoveAnimateClass { panel } => {
                    if let Some(panel) = self.panel(&panel) {
                        dom::remove_class(&panel, ANIMATE_CLASS);
                    }
                }
                TabEffect::Focus { tab } => {
                    if let Some(button) = self.buttons.get(tab) {
                        let _ = button.focus();
                    }
                }
                TabEffect::DispatchSwitch { tab } => self.dispatch_switch(&tab),
                TabEffect::PublishTabChanged => {
                    let active = self.controller.borrow().active_id().map(str::to_string);
                    event_bus::publish(event_bus::TAB_CHANGED, &serde_json::json!({ "tab": active }));
                }
                TabEffect::PushHistory { tab } => push_history(&tab),
                TabEffect::ScrollToTop { delay_ms } => later(delay_ms, || {
                    if let Some(window) = web_sys::window() {
                        window.scroll_to_with_x_and_y(0.0, 0.0);
                    }
                }),
            }
        }
    }

    fn dispatch_switch(&self, tab: &str) {
        let Some(tab_list) = &self.tab_list else {
            return;
        };
        let detail = match serde_wasm_bindgen::to_value(&SwitchDetail { tab }) {
            Ok(detail) => detail,
            Err(e) => {
                log::warn!("tab switch detail: {}", e);
                return;
            }
        };
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict("switch", &init) {
            Ok(event) => {
                let _ = tab_list.dispatch_event(&event);
            }
            Err(e) => log::warn!("failed to create switch event: {:?}", e),
        }
    }
}

/// Bindings held weakly so one window listener serves every tab set.
struct LiveBindings<T> {
    entries: Vec<Weak<T>>,
}

impl<T> LiveBindings<T> {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, binding: &Rc<T>) {
        self.entries.push(Rc::downgrade(binding));
    }

    /// Live bindings in insertion order; dropped or detached ones are forgotten.
    fn retain_live(&mut self, is_live: impl Fn(&T) -> bool) -> Vec<Rc<T>> {
        let mut live = Vec::new();
        self.entries.retain(|weak| match weak.upgrade() {
            Some(binding) if is_live(&binding) => {
                live.push(binding);
                true
            }
            _ => false,
        });
        live
    }
}

thread_local! {
    static POP_STATE: RefCell<LiveBindings<TabsBinding>> = const { RefCell::new(LiveBindings::new()) };
    static POP_STATE_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn is_attached(binding: &TabsBinding) -> bool {
    binding.container.is_connected()
}

/// Route history pops to `binding` while its container stays in the document.
///
/// Modal steps rebuild their tab sets on every load, so detached sets are
/// pruned here and on each pop.
fn watch_pop_state(binding: &Rc<TabsBinding>) {
    POP_STATE.with(|set| {
        let mut set = set.borrow_mut();
        set.retain_live(is_attached);
        set.insert(binding);
    });
    if POP_STATE_BOUND.with(|bound| bound.replace(true)) {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    dom::listen(&window, "popstate", |e| {
        let state = e
            .dyn_ref::<PopStateEvent>()
            .map(|p| p.state())
            .and_then(|s| serde_wasm_bindgen::from_value::<HistoryTabState>(s).ok());
        let tab = state.as_ref().map(|s| s.tab_content.as_str());
        let bindings = POP_STATE.with(|set| set.borrow_mut().retain_live(is_attached));
        for binding in bindings {
            let effects = binding.controller.borrow_mut().on_pop_state(tab);
            binding.apply(effects);
        }
    });
}

fn panel_in(container: &Element, id: &str) -> Option<HtmlElement> {
    if id.is_empty() {
        return None;
    }
    dom::query_as::<HtmlElement>(container, &format!("[id=\"{}\"]", id))
}

/// Run `f` now, or after `delay_ms` on a fire-and-forget timer.
fn later(delay_ms: u32, f: impl FnOnce() + 'static) {
    if delay_ms == 0 {
        f();
    } else {
        Timeout::new(delay_ms, f).forget();
    }
}

fn push_history(tab: &str) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let state = HistoryTabState {
        tab_content: tab.to_string(),
    };
    let Ok(state) = serde_wasm_bindgen::to_value(&state) else {
        return;
    };
    if let Err(e) = history.push_state_with_url(&state, "", Some(&format!("#{}", tab))) {
        log::warn!("pushState failed: {:?}", e);
    }
}

/// Bind every `[data-wm-tabs]` container under `root`, `root` included.
pub fn init_tabs(root: &Element, transition_ms: u32) -> Vec<Rc<TabsBinding>> {
    let mut containers = Vec::new();
    if root.has_attribute("data-wm-tabs") {
        containers.push(root.clone());
    }
    containers.extend(dom::query_all(root, "[data-wm-tabs]"));

    containers
        .into_iter()
        .filter(|c| dom::bind_once(c, "wm-tabs"))
        .filter_map(|c| TabsBinding::attach(c, transition_ms))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        name: &'static str,
        attached: Cell<bool>,
    }

    fn fake(name: &'static str) -> Rc<Fake> {
        Rc::new(Fake {
            name,
            attached: Cell::new(true),
        })
    }

    fn names(bindings: &[Rc<Fake>]) -> Vec<&'static str> {
        bindings.iter().map(|b| b.name).collect()
    }

    #[test]
    fn test_detached_tab_sets_are_pruned() {
        let mut set = LiveBindings::new();
        let page = fake("page");
        let first_step = fake("first_step");
        set.insert(&page);
        set.insert(&first_step);

        // The modal body was replaced by the next step.
        first_step.attached.set(false);
        let second_step = fake("second_step");
        set.retain_live(|b| b.attached.get());
        set.insert(&second_step);

        let live = set.retain_live(|b| b.attached.get());
        assert_eq!(names(&live), vec!["page", "second_step"]);
        assert_eq!(set.entries.len(), 2);

        first_step.attached.set(true);
        assert_eq!(names(&set.retain_live(|b| b.attached.get())), vec!["page", "second_step"]);
    }

    #[test]
    fn test_dropped_bindings_are_forgotten() {
        let mut set = LiveBindings::new();
        let kept = fake("kept");
        set.insert(&kept);
        {
            let gone = fake("gone");
            set.insert(&gone);
        }
        assert_eq!(names(&set.retain_live(|_| true)), vec!["kept"]);
        assert_eq!(set.entries.len(), 1);
    }
}
