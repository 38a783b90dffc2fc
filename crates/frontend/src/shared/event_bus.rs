//! Document-scoped publish/subscribe channel.
//!
//! Components never hold references to each other; they agree only on event
//! names. The bus lives as long as the page (one instance per thread, and the
//! wasm module only ever runs on the page's main thread).

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Published by the tab controller after every tab switch.
pub const TAB_CHANGED: &str = "wagtail:tab-changed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Value)>;

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: HashMap<String, Vec<(SubscriptionId, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: &str, handler: impl Fn(&Value) + 'static) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(event.to_string())
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for handlers in self.subscribers.values_mut() {
            let before = handlers.len();
            handlers.retain(|(sid, _)| *sid != id);
            removed |= handlers.len() != before;
        }
        removed
    }

    /// Handlers registered for `event`, in subscription order.
    fn handlers_for(&self, event: &str) -> Vec<Handler> {
        self.subscribers
            .get(event)
            .map(|hs| hs.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default()
    }
}

thread_local! {
    static BUS: RefCell<EventBus> = RefCell::new(EventBus::new());
}

pub fn subscribe(event: &str, handler: impl Fn(&Value) + 'static) -> SubscriptionId {
    BUS.with(|bus| bus.borrow_mut().subscribe(event, handler))
}

pub fn unsubscribe(id: SubscriptionId) -> bool {
    BUS.with(|bus| bus.borrow_mut().unsubscribe(id))
}

/// Deliver `payload` to every subscriber of `event`; returns how many ran.
///
/// The handler list is copied out before dispatch so a handler may itself
/// subscribe or publish without a re-entrant borrow.
pub fn publish(event: &str, payload: &Value) -> usize {
    let handlers = BUS.with(|bus| bus.borrow().handlers_for(event));
    log::debug!("event '{}' -> {} subscriber(s)", event, handlers.len());
    for handler in &handlers {
        handler(payload);
    }
    handlers.len()
}
