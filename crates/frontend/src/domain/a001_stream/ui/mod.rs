pub mod chooser;
pub mod chooser_modal;
