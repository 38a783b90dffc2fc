//! Thin helpers over `web_sys` for binding behavior to server-rendered markup.
//!
//! Every lookup returns `Option`/`Vec`: a missing optional affordance in the
//! server markup must never panic.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget};

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

/// First element under `root` matching `selector`.
pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

/// First element matching any of the selectors, in order of preference.
pub fn query_first(root: &Element, selectors: &[&str]) -> Option<Element> {
    selectors.iter().find_map(|s| query(root, s))
}

pub fn query_as<T: JsCast>(root: &Element, selector: &str) -> Option<T> {
    query(root, selector).and_then(|el| el.dyn_into::<T>().ok())
}

/// All elements under `root` matching `selector`, in document order.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Attach an event listener for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("failed to attach '{}' listener: {:?}", event, e);
    }
    // The element owns the listener from here on; dropping the closure would invalidate it.
    closure.forget();
}

/// Mark `el` as bound under `marker`; returns false when it already was.
///
/// Handler attachment runs again after every content replacement, so each
/// binder checks this first to stay idempotent.
pub fn bind_once(el: &Element, marker: &str) -> bool {
    let attr = format!("data-bound-{}", marker);
    if el.has_attribute(&attr) {
        return false;
    }
    let _ = el.set_attribute(&attr, "");
    true
}

pub fn add_class(el: &Element, class: &str) {
    let _ = el.class_list().add_1(class);
}

pub fn remove_class(el: &Element, class: &str) {
    let _ = el.class_list().remove_1(class);
}

/// Element that owns the listener currently handling `event`.
pub fn current_element(event: &Event) -> Option<Element> {
    event
        .current_target()
        .and_then(|t| t.dyn_into::<Element>().ok())
}
