//! Terminal output.

pub mod models;
pub mod view;

pub use models::format_model_table;
pub use view::TerminalView;
