pub mod config;
pub mod dialog;
pub mod panels;
pub mod walk;

pub use config::config_command;
pub use dialog::{DialogCommand, dialog_command};
pub use panels::panels_command;
pub use walk::{WalkCommand, walk_command};
