//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - A scripted container runtime
//! - Recording progress, display and notifier doubles
//! - A temporary host environment with config and SSH keys

pub mod fakes;
pub mod fixtures;

#[allow(unused_imports)]
pub use fakes::*;
#[allow(unused_imports)]
pub use fixtures::*;
