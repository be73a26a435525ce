//! # uoi-protocol
//!
//! Shared data models for the single-node cloud installer.
//!
//! This crate defines the data structures passed between:
//! - the installation workflow and its progress reporters
//! - the installer core and the terminal UI
//!
//! ## Modules
//!
//! - [`task_models`]: Named progress tasks and rendered status lines
//! - [`install_models`]: Operator options and workflow outcomes
//! - [`readiness_models`]: Decoded cloud-init status artifact
//! - [`ipc`]: Events sent from the core to the UI

pub mod install_models;
pub mod ipc;
pub mod readiness_models;
pub mod task_models;

// Re-export all public types for convenience
pub use install_models::*;
pub use ipc::*;
pub use readiness_models::*;
pub use task_models::*;
