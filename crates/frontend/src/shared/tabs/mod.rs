//! Accessible tab panels for server-rendered markup
//!
//! - `controller` - state machine: selection, keyboard, history
//! - `dom` - binds the controller to a `[data-wm-tabs]` container

pub mod controller;
pub mod dom;

pub use controller::{TabController, TabEffect, TabOptions, TabSpec};
pub use dom::{init_tabs, TabsBinding};
