//! Configuration loading and management.
//!
//! This module loads the installer configuration from the host-side
//! state directory (`~/.cloud-install` by default).

pub mod error;
pub mod loader;
pub mod models;
