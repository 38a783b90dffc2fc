use gloo_timers::future::TimeoutFuture;
use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// Modal frame container (overlay + positioned surface + close button).
///
/// Content is rendered as-is; the modal workflow injects server markup into it.
#[component]
pub fn ModalFrame(
    /// Called when the modal should close (overlay click, close button).
    on_close: Callback<()>,
    /// z-index for overlay stacking (default: 1000).
    #[prop(optional)]
    z_index: Option<i32>,
    /// Extra class for the modal surface (`div.modal`).
    #[prop(optional)]
    modal_class: Option<String>,
    children: Children,
) -> impl IntoView {
    let z_index = z_index.unwrap_or(1000);
    let overlay_mouse_down = RwSignal::new(false);

    let is_direct_overlay_event = |ev: &ev::MouseEvent| -> bool {
        match (ev.target(), ev.current_target()) {
            (Some(t), Some(ct)) => t == ct,
            _ => false,
        }
    };

    // Close only if both press and release happened on the overlay itself,
    // so a text selection dragged outside the dialog does not dismiss it.
    let handle_overlay_mouse_down = move |ev: ev::MouseEvent| {
        overlay_mouse_down.set(is_direct_overlay_event(&ev));
    };

    let close_next_tick = move || {
        spawn_local(async move {
            TimeoutFuture::new(0).await;
            on_close.run(());
        });
    };

    let handle_overlay_click = move |ev: ev::MouseEvent| {
        let should_close = overlay_mouse_down.get() && is_direct_overlay_event(&ev);
        overlay_mouse_down.set(false);
        if should_close {
            close_next_tick();
        }
    };

    let surface_class = match modal_class {
        Some(cls) if !cls.is_empty() => format!("modal {cls}"),
        _ => "modal".to_string(),
    };

    view! {
        <div
            class="modal-overlay"
            style=format!("z-index: {z_index};")
            on:mousedown=handle_overlay_mouse_down
            on:click=handle_overlay_click
        >
            <div
                class=surface_class
                role="dialog"
                aria-modal="true"
                style="position: relative;"
                on:click=|ev: ev::MouseEvent| ev.stop_propagation()
            >
                <button
                    type="button"
                    class="button close button--icon text-replace"
                    aria-label="Close dialog"
                    on:click=move |_| close_next_tick()
                >
                    "×"
                </button>
                {children()}
            </div>
        </div>
    }
}
