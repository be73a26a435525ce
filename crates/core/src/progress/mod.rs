//! Named-task progress tracking.
//!
//! This module provides:
//! - [`TaskLedger`]: ordered tasks with start/end timestamps
//! - [`ProgressReporter`]: the trait the install workflow reports through
//! - [`LiveProgress`]: renders the ledger to a display on a fixed cadence
//! - [`HeadlessProgress`]: no-op variant for non-interactive runs

pub mod clock;
pub mod headless;
pub mod ledger;
pub mod live;
pub mod reporter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use headless::HeadlessProgress;
pub use ledger::TaskLedger;
pub use live::{format_task_lines, LiveProgress, LiveProgressOptions, RENDER_INTERVAL};
pub use reporter::ProgressReporter;
