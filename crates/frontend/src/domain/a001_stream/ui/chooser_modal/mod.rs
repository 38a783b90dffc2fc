//! Stream chooser modal
//!
//! Step handlers for the modal opened by the stream chooser widget:
//! - `chooser`: live search, paging, ordering and upload ([`bindings`])
//! - `select_format`: a form posted back to the server
//! - `video_chosen`: relays the chosen stream to the widget and closes

pub mod bindings;
pub mod model;
pub mod session;
pub mod upload;

use crate::shared::dom;
use crate::shared::modal_workflow::{ModalWorkflow, StepHandlers};
use bindings::ChooserStepBinding;
use contracts::usecases::u001_stream_chooser::response::{
    ModalStep, StreamChosenStepData, RESPONSE_STREAM_CHOSEN, STEP_CHOOSER, STEP_SELECT_FORMAT,
    STEP_STREAM_CHOSEN,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{FormData, HtmlElement, HtmlFormElement};

/// `on_load` handlers of the stream chooser modal.
pub fn step_handlers() -> StepHandlers {
    StepHandlers::new()
        .on(STEP_CHOOSER, |modal, body, step| {
            ChooserStepBinding::attach(modal, body, step);
        })
        .on(STEP_STREAM_CHOSEN, on_stream_chosen)
        .on(STEP_SELECT_FORMAT, |modal, body, _| bind_select_format(modal, body))
}

fn on_stream_chosen(modal: ModalWorkflow, _body: &HtmlElement, step: &ModalStep) {
    let payload = step
        .data_as::<StreamChosenStepData>()
        .map_err(|e| e.to_string())
        .and_then(|data| serde_json::to_value(&data.result).map_err(|e| e.to_string()));
    match payload {
        Ok(payload) => {
            modal.respond(RESPONSE_STREAM_CHOSEN, &payload);
        }
        Err(e) => log::error!("invalid chosen stream: {}", e),
    }
    modal.close();
}

fn bind_select_format(modal: ModalWorkflow, body: &HtmlElement) {
    for form in dom::query_all(body, "form") {
        let Ok(form) = form.dyn_into::<HtmlFormElement>() else {
            continue;
        };
        if !dom::bind_once(&form, "select-format") {
            continue;
        }
        let target = form.clone();
        dom::listen(&form, "submit", move |e| {
            e.prevent_default();
            let form_data = match FormData::new_with_form(&target) {
                Ok(form_data) => form_data,
                Err(e) => {
                    log::error!("format form data: {:?}", e);
                    return;
                }
            };
            let action = target.action();
            spawn_local(async move {
                match model::submit_format(&action, &form_data).await {
                    Ok(text) => {
                        if let Err(e) = modal.load_response_text(&text) {
                            log::error!("format selection response: {}", e);
                        }
                    }
                    Err(e) => log::error!("format selection failed: {}", e),
                }
            });
        });
    }
}
