//! Stream chooser widget
//!
//! Form widget for picking one stream: the pure [`state`] of the selection,
//! its DOM binding ([`widget`]) and the registry [`definition`] used to
//! hydrate server-rendered placeholders.

pub mod definition;
pub mod state;
pub mod widget;

pub use definition::{register, StreamChooserDefinition, STREAM_CHOOSER_TYPE};
pub use widget::StreamChooserWidget;
