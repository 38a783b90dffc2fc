use super::ModalWorkflow;
use contracts::usecases::u001_stream_chooser::response::ModalStep;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use web_sys::HtmlElement;

pub type StepHandler = Rc<dyn Fn(ModalWorkflow, &HtmlElement, &ModalStep)>;
pub type ResponseCallback = Rc<dyn Fn(&Value)>;

/// `on_load` handlers keyed by step name.
#[derive(Clone, Default)]
pub struct StepHandlers {
    handlers: HashMap<String, StepHandler>,
}

impl StepHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, step: &str, handler: impl Fn(ModalWorkflow, &HtmlElement, &ModalStep) + 'static) -> Self {
        self.handlers.insert(step.to_string(), Rc::new(handler));
        self
    }

    pub fn get(&self, step: &str) -> Option<StepHandler> {
        self.handlers.get(step).cloned()
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

/// Callbacks the opener registers for results relayed by `respond`.
#[derive(Clone, Default)]
pub struct ResponseCallbacks {
    callbacks: HashMap<String, ResponseCallback>,
}

impl ResponseCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, name: &str, callback: impl Fn(&Value) + 'static) -> Self {
        self.callbacks.insert(name.to_string(), Rc::new(callback));
        self
    }

    pub fn get(&self, name: &str) -> Option<ResponseCallback> {
        self.callbacks.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_response_callbacks_by_name() {
        let received = Rc::new(RefCell::new(None));
        let r = Rc::clone(&received);
        let callbacks = ResponseCallbacks::new().on("streamChosen", move |v| {
            *r.borrow_mut() = Some(v.clone());
        });

        assert!(callbacks.get("other").is_none());
        let callback = callbacks.get("streamChosen").unwrap();
        callback(&json!({"id": 1}));
        assert_eq!(*received.borrow(), Some(json!({"id": 1})));
    }

    #[test]
    fn test_later_step_handler_replaces_earlier() {
        let handlers = StepHandlers::new()
            .on("chooser", |_, _, _| {})
            .on("select_format", |_, _, _| {})
            .on("chooser", |_, _, _| {});
        let mut steps: Vec<&str> = handlers.steps().collect();
        steps.sort();
        assert_eq!(steps, vec!["chooser", "select_format"]);
        assert!(handlers.get("video_chosen").is_none());
    }
}
