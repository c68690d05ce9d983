//! TUI widgets for the story writer

pub mod input;
pub mod output;

pub use input::InputWidget;
pub use output::{wrapped_row_count, OutputWidget};
