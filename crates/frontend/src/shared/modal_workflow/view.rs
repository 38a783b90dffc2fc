use super::ModalWorkflow;
use leptos::prelude::*;

/// Body of a workflow modal: server step HTML lands here.
#[component]
pub fn ModalWorkflowBody(workflow: ModalWorkflow) -> impl IntoView {
    // The modal entry leaves the stack however it was dismissed; take the workflow with it.
    workflow.release_on_cleanup();

    let loading = move || workflow.step.try_with(|s| s.is_none()).unwrap_or(false);

    // Inject step HTML, then hand the fresh body to the step's handler.
    Effect::new(move |_| {
        let Some(step) = workflow.step.try_get().flatten() else {
            return;
        };
        let Some(body) = workflow.body.try_get().flatten() else {
            return;
        };
        if let Some(html) = &step.html {
            body.set_inner_html(html);
        }
        let body: web_sys::HtmlElement = body.into();
        untrack(|| workflow.run_step_handler(&body, &step));
    });

    view! {
        <div class="modal-workflow__loading" class:hidden=move || !loading()>
            "Loading…"
        </div>
        <div class="modal-workflow__body" node_ref=workflow.body></div>
    }
}
