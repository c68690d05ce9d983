//! UI module for the story TUI

pub mod render;
pub mod theme;
pub mod widgets;

pub use render::Overlay;
