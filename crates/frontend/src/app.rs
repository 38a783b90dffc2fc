use crate::shared::config::config;
use crate::shared::dom;
use crate::shared::modal_stack::{ModalHost, ModalStackService};
use crate::shared::tabs::init_tabs;
use crate::shared::widget_registry::hydrate_placeholders;
use leptos::prelude::*;

/// Root component. The admin page itself is server-rendered; the app only
/// hosts modals and binds behavior to the existing markup.
#[component]
pub fn App() -> impl IntoView {
    let modals = ModalStackService::new();
    // Widgets bound outside the reactive tree open modals through the global handle.
    modals.install_global();
    provide_context(modals);

    Effect::new(move |_| {
        let Some(body) = dom::document().and_then(|d| d.body()) else {
            return;
        };
        let tabs = init_tabs(&body, config().tab_transition_ms);
        let widgets = hydrate_placeholders(&body);
        log::info!("bound {} tab set(s), {} widget(s)", tabs.len(), widgets.len());
    });

    view! {
        <ModalHost />
    }
}
