pub mod api_utils;
pub mod config;
pub mod dom;
pub mod event_bus;
pub mod modal_frame;
pub mod modal_stack;
pub mod modal_workflow;
pub mod tabs;
pub mod widget_registry;
