//! TUI widgets module.
//!
//! This module contains the widgets composing the installer screen.

pub mod progress;

pub use progress::render_progress;
