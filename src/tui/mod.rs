// TUI module - Terminal User Interface

pub mod app;
pub mod keys;
pub mod pane;
pub mod surface;

pub use keys::{CrosstermKeys, KeySource, TermEvent};
pub use pane::{OutputAction, OutputPane};
pub use surface::{restore_terminal, Surface, SurfaceSnapshot, TerminalSurface};
