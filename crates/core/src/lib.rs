//! # uoi-core
//!
//! Installation workflow engine for the single-node cloud installer.
//!
//! This crate provides:
//! - Configuration loading from the `.cloud-install/` directory
//! - Named-task progress tracking with live and headless reporters
//! - The container runtime abstraction and its LXC implementation
//! - The install workflow and the cloud-init readiness poller
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and derived paths
//! - [`progress`]: Task ledger and progress reporters
//! - [`display`]: Output seams towards the frontend
//! - [`container`]: Container runtime trait and LXC backend
//! - [`templates`]: Embedded configuration templates
//! - [`host`]: Host-side file, key and permission helpers
//! - [`install`]: Install workflow and readiness polling

pub mod config;
pub mod container;
pub mod display;
pub mod host;
pub mod install;
pub mod progress;
pub mod templates;
