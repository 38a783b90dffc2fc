//! Modal workflow
//!
//! A modal that walks through server-rendered steps. Every server response is
//! a [`ModalStep`]: its HTML replaces the modal body, then the `on_load`
//! handler registered for the step name runs against the new body. Handlers
//! can load the next step (`load_url`, `load_response_text`), relay a result
//! to the opener (`respond`) and `close` the modal.
//!
//! ```rust,ignore
//! ModalWorkflow::open(ModalWorkflowConfig {
//!     url: chooser_url,
//!     on_load: StepHandlers::new().on("chooser", |modal, body, step| { /* ... */ }),
//!     responses: ResponseCallbacks::new().on("streamChosen", |payload| { /* ... */ }),
//! })?;
//! ```
//!
//! A workflow's signals and callbacks live until its body leaves the modal
//! stack, however the modal was dismissed (Escape, overlay, close button or
//! [`ModalWorkflow::close`]).

mod callbacks;
mod view;

pub use callbacks::{ResponseCallbacks, StepHandlers};

use crate::shared::api_utils;
use crate::shared::modal_stack::{ModalHandle, ModalStackService};
use contracts::usecases::u001_stream_chooser::response::ModalStep;
use leptos::html::Div;
use leptos::prelude::*;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;
use view::ModalWorkflowBody;
use web_sys::HtmlElement;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModalWorkflowError {
    #[error("no modal host is mounted")]
    NoModalHost,
    #[error("invalid modal step: {0}")]
    InvalidStep(String),
    #[error("modal workflow is closed")]
    Closed,
}

pub struct ModalWorkflowConfig {
    pub url: String,
    pub on_load: StepHandlers,
    pub responses: ResponseCallbacks,
}

/// Everything a workflow owns outside the reactive tree.
struct Registration {
    /// Owns `step`, `body` and `handle`; dropping it disposes them.
    owner: Owner,
    on_load: StepHandlers,
    responses: ResponseCallbacks,
}

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
    // Handlers are plain closures over DOM state; they stay on this thread.
    static REGISTRATIONS: RefCell<HashMap<u64, Registration>> = RefCell::new(HashMap::new());
}

/// Handle to one open modal workflow. Cheap to copy into event handlers.
#[derive(Clone, Copy)]
pub struct ModalWorkflow {
    id: u64,
    step: RwSignal<Option<ModalStep>>,
    body: NodeRef<Div>,
    handle: RwSignal<Option<ModalHandle>>,
}

impl ModalWorkflow {
    /// Open a modal and load `config.url` as its first step.
    pub fn open(config: ModalWorkflowConfig) -> Result<Self, ModalWorkflowError> {
        let svc = ModalStackService::global().ok_or(ModalWorkflowError::NoModalHost)?;
        let url = config.url.clone();
        let workflow = Self::register(config);

        let handle = svc.push(Some("modal-workflow".to_string()), move |_| {
            view! { <ModalWorkflowBody workflow=workflow /> }.into_any()
        });
        workflow.handle.set(Some(handle));
        log::debug!("modal workflow #{} opened: {}", workflow.id, url);

        workflow.load_url(&url);
        Ok(workflow)
    }

    /// Create the workflow's signals under an owner kept in the registry.
    ///
    /// `open` runs from DOM listeners where no reactive owner is current, so
    /// the registry is what keeps the signals alive until [`Self::release`].
    fn register(config: ModalWorkflowConfig) -> Self {
        let id = NEXT_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        let owner = Owner::new();
        let workflow = owner.with(|| Self {
            id,
            step: RwSignal::new(None),
            body: NodeRef::new(),
            handle: RwSignal::new(None),
        });
        REGISTRATIONS.with(|r| {
            r.borrow_mut().insert(
                id,
                Registration {
                    owner,
                    on_load: config.on_load,
                    responses: config.responses,
                },
            )
        });
        workflow
    }

    fn is_registered(self) -> bool {
        REGISTRATIONS.with(|r| r.borrow().contains_key(&self.id))
    }

    /// Drop callbacks and dispose the signals. Runs when the body unmounts.
    fn release(self) {
        let registration = REGISTRATIONS.with(|r| r.borrow_mut().remove(&self.id));
        if registration.is_some() {
            log::debug!("modal workflow #{} released", self.id);
        }
        // Dropped outside the borrow: disposal may run cleanups that touch the registry.
        drop(registration);
    }

    /// Release the workflow when the current reactive owner is cleaned up.
    fn release_on_cleanup(self) {
        on_cleanup(move || self.release());
    }

    /// Fetch `url` and show the response as the next step.
    pub fn load_url(self, url: &str) {
        let url = url.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match api_utils::get_text(&url, None).await {
                Ok(text) => {
                    if let Err(e) = self.load_response_text(&text) {
                        log::error!("modal workflow #{}: {}", self.id, e);
                    }
                }
                Err(e) if e.is_aborted() => {}
                Err(e) => log::error!("modal workflow #{}: failed to load {}: {}", self.id, url, e),
            }
        });
    }

    /// Show an already fetched server response as the next step.
    pub fn load_response_text(self, text: &str) -> Result<(), ModalWorkflowError> {
        let step =
            ModalStep::parse(text).map_err(|e| ModalWorkflowError::InvalidStep(e.to_string()))?;
        log::debug!("modal workflow #{}: step '{}'", self.id, step.step);
        if self.step.try_set(Some(step)).is_some() {
            return Err(ModalWorkflowError::Closed);
        }
        Ok(())
    }

    /// Relay a result to the opener; false when no callback is registered for `name`.
    pub fn respond(self, name: &str, payload: &serde_json::Value) -> bool {
        let callback =
            REGISTRATIONS.with(|r| r.borrow().get(&self.id).and_then(|reg| reg.responses.get(name)));
        match callback {
            Some(callback) => {
                callback(payload);
                true
            }
            None => {
                log::warn!("modal workflow #{}: no response callback '{}'", self.id, name);
                false
            }
        }
    }

    /// Close the modal; its state is released once the body unmounts.
    pub fn close(self) {
        if let Some(handle) = self.handle.try_get_untracked().flatten() {
            if handle.is_open() {
                handle.close();
            }
        }
        log::debug!("modal workflow #{} closed", self.id);
    }

    /// Root element of the injected step content.
    pub fn body(self) -> Option<HtmlElement> {
        self.body.try_get_untracked().flatten().map(|div| div.into())
    }

    fn run_step_handler(self, body: &HtmlElement, step: &ModalStep) {
        let (handler, known) = REGISTRATIONS.with(|r| {
            let registrations = r.borrow();
            match registrations.get(&self.id) {
                Some(reg) => (
                    reg.on_load.get(&step.step),
                    reg.on_load.steps().map(str::to_string).collect::<Vec<_>>(),
                ),
                None => (None, Vec::new()),
            }
        });
        match handler {
            Some(handler) => handler(self, body, step),
            None => log::warn!(
                "modal workflow #{}: no handler for step '{}' (known: {})",
                self.id,
                step.step,
                known.join(", ")
            ),
        }
    }
}
