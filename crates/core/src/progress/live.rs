//! Live progress reporter.
//!
//! `LiveProgress` owns the task ledger and renders it to a
//! [`StatusDisplay`] every [`RENDER_INTERVAL`] on a background tokio task.
//! The render loop is started lazily by the first `start_task` and runs
//! independently of the workflow's pace, so a long blocking step (such as
//! waiting for the container to boot) keeps showing a ticking clock.
//!
//! `halt` may race with an in-flight tick. The stop flag is checked at the
//! top of each tick and the next tick is scheduled at the bottom, so at most
//! one redundant tick can follow a halt.

use super::clock::{Clock, SystemClock};
use super::ledger::TaskLedger;
use super::reporter::ProgressReporter;
use crate::display::StatusDisplay;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uoi_protocol::{StatusLine, Task, TaskStatus};

/// Delay between two renders of the task list.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(300);

/// Width of the status column.
const STATUS_WIDTH: usize = 22;

/// Tunables for [`LiveProgress`].
pub struct LiveProgressOptions {
    /// Delay between renders.
    pub interval: Duration,

    /// Where to rewrite the timing record after every `start_task`.
    /// `None` disables the record.
    pub timings_path: Option<PathBuf>,

    /// Time source for stamping and rendering.
    pub clock: Arc<dyn Clock>,
}

impl Default for LiveProgressOptions {
    fn default() -> Self {
        Self {
            interval: RENDER_INTERVAL,
            timings_path: None,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Progress reporter that periodically renders the ledger to a display.
pub struct LiveProgress {
    inner: Arc<LiveInner>,
}

struct LiveInner {
    ledger: RwLock<TaskLedger>,
    clock: Arc<dyn Clock>,
    display: Arc<dyn StatusDisplay>,
    /// Raised by `halt`; observed at the top of every tick.
    stopped: AtomicBool,
    /// Handle of the running render loop, `None` once it has exited.
    render_loop: Mutex<Option<JoinHandle<()>>>,
    timings_path: Option<PathBuf>,
    interval: Duration,
    runtime: Handle,
}

impl LiveProgress {
    /// Create a reporter that spawns its render loop on `runtime`.
    ///
    /// Taking the handle explicitly lets the workflow call `start_task` from
    /// any thread, including ones outside the runtime.
    pub fn new(
        display: Arc<dyn StatusDisplay>,
        runtime: Handle,
        options: LiveProgressOptions,
    ) -> Self {
        Self {
            inner: Arc::new(LiveInner {
                ledger: RwLock::new(TaskLedger::new(Arc::clone(&options.clock))),
                clock: options.clock,
                display,
                stopped: AtomicBool::new(false),
                render_loop: Mutex::new(None),
                timings_path: options.timings_path,
                interval: options.interval,
                runtime,
            }),
        }
    }

    /// Render the current ledger once and push it to the display.
    pub fn render_tick(&self) -> Vec<StatusLine> {
        self.inner.render_tick()
    }

    /// Copy of the ledger's tasks.
    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.read_ledger(|ledger| ledger.snapshot())
    }

    /// Index of the active (or next) task.
    pub fn current_index(&self) -> usize {
        self.inner.read_ledger(|ledger| ledger.current_index())
    }

    /// Whether a render loop is currently scheduled.
    pub fn is_rendering(&self) -> bool {
        let slot = self
            .inner
            .render_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start the render loop unless one is already scheduled.
    fn ensure_rendering(&self) {
        let mut slot = self
            .inner
            .render_loop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        *slot = Some(self.inner.runtime.spawn(inner.render_loop()));
    }

    fn persist_timings(&self) {
        let Some(path) = &self.inner.timings_path else {
            return;
        };

        let tasks = self.snapshot();
        let result = serde_yaml::to_string(&tasks)
            .map_err(|e| e.to_string())
            .and_then(|yaml| crate::host::spew(path, &yaml).map_err(|e| e.to_string()));

        if let Err(error) = result {
            tracing::warn!(path = %path.display(), %error, "failed to write timing record");
        }
    }
}

impl LiveInner {
    fn read_ledger<T>(&self, f: impl FnOnce(&TaskLedger) -> T) -> T {
        let ledger = self.ledger.read().unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }

    fn write_ledger<T>(&self, f: impl FnOnce(&mut TaskLedger) -> T) -> T {
        let mut ledger = self.ledger.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut ledger)
    }

    fn render_tick(&self) -> Vec<StatusLine> {
        let (tasks, width) = self.read_ledger(|ledger| (ledger.snapshot(), ledger.max_name_width()));
        let lines = format_task_lines(&tasks, width, self.clock.now());
        self.display.render_progress(lines.clone());
        lines
    }

    async fn render_loop(self: Arc<Self>) {
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                // Re-check under the slot lock so a concurrent `start_task`
                // either sees this loop gone or this loop sees the cleared flag.
                let mut slot = self
                    .render_loop
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if self.stopped.load(Ordering::SeqCst) {
                    *slot = None;
                    tracing::trace!("progress render loop halted");
                    return;
                }
            }

            self.render_tick();
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl ProgressReporter for LiveProgress {
    fn register_tasks(&self, names: &[&str]) {
        tracing::debug!(tasks = ?names, "registering progress tasks");
        self.inner.write_ledger(|ledger| ledger.register(names));
    }

    fn start_task(&self, name: &str) {
        tracing::debug!(task = name, "start_task");
        self.inner.write_ledger(|ledger| ledger.start(name));
        self.inner.stopped.store(false, Ordering::SeqCst);
        self.ensure_rendering();
        self.persist_timings();
    }

    fn stop_current_task(&self) {
        tracing::debug!("stop_current_task");
        self.inner.write_ledger(|ledger| ledger.stop_current());
        // Show the finished state before going quiet.
        self.inner.render_tick();
        self.halt();
    }

    fn halt(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }
}

/// Format every task as `"<right-aligned name>: <status>"`.
///
/// Pending tasks show `   -`, running tasks their time so far, and done
/// tasks their total time as an emphasized line.
pub fn format_task_lines(tasks: &[Task], name_width: usize, now: DateTime<Utc>) -> Vec<StatusLine> {
    tasks
        .iter()
        .map(|task| {
            let elapsed = task.elapsed_secs(now).unwrap_or(0.0);
            match task.status() {
                TaskStatus::Pending => StatusLine::plain(format_line(&task.name, name_width, "   -")),
                TaskStatus::Running => StatusLine::plain(format_line(
                    &task.name,
                    name_width,
                    &format!("{elapsed:6.2} sec elapsed"),
                )),
                TaskStatus::Done => StatusLine::emphasized(format_line(
                    &task.name,
                    name_width,
                    &format!("{elapsed:6.2} sec"),
                )),
            }
        })
        .collect()
}

fn format_line(name: &str, name_width: usize, status: &str) -> String {
    format!("{name:>name_width$}: {status:<STATUS_WIDTH$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::clock::ManualClock;
    use chrono::Duration as ChronoDuration;

    #[derive(Default)]
    struct RecordingDisplay {
        renders: Mutex<Vec<Vec<StatusLine>>>,
    }

    impl RecordingDisplay {
        fn render_count(&self) -> usize {
            self.renders.lock().map(|r| r.len()).unwrap_or(0)
        }
    }

    impl StatusDisplay for RecordingDisplay {
        fn render_progress(&self, lines: Vec<StatusLine>) {
            if let Ok(mut renders) = self.renders.lock() {
                renders.push(lines);
            }
        }

        fn info_message(&self, _message: &str) {}
    }

    fn live_with_clock(
        interval: Duration,
    ) -> (LiveProgress, Arc<RecordingDisplay>, Arc<ManualClock>) {
        let display = Arc::new(RecordingDisplay::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let progress = LiveProgress::new(
            display.clone(),
            Handle::current(),
            LiveProgressOptions {
                interval,
                timings_path: None,
                clock: clock.clone(),
            },
        );
        (progress, display, clock)
    }

    #[test]
    fn test_format_task_lines() {
        let start = Utc::now();
        let mut done = Task::pending("Initializing Environment");
        done.started_at = Some(start);
        done.ended_at = Some(start + ChronoDuration::milliseconds(1250));

        let mut running = Task::pending("Creating container");
        running.started_at = Some(start + ChronoDuration::milliseconds(1250));

        let pending = Task::pending("Starting Juju server");

        let now = start + ChronoDuration::milliseconds(4000);
        let lines = format_task_lines(&[done, running, pending], 24, now);

        assert_eq!(
            lines[0],
            StatusLine::emphasized(format!(
                "Initializing Environment:   1.25 sec{}",
                " ".repeat(12)
            ))
        );
        assert_eq!(
            lines[1],
            StatusLine::plain(format!(
                "      Creating container:   2.75 sec elapsed{}",
                " ".repeat(4)
            ))
        );
        assert_eq!(
            lines[2],
            StatusLine::plain(format!("    Starting Juju server:    -{}", " ".repeat(18)))
        );
    }

    #[test]
    fn test_pending_line_has_no_elapsed_time() {
        let lines = format_task_lines(&[Task::pending("A")], 1, Utc::now());
        assert!(!lines[0].text.contains("sec"));
        assert!(!lines[0].emphasis);
    }

    #[tokio::test]
    async fn test_render_loop_starts_lazily() {
        let (progress, display, _clock) = live_with_clock(Duration::from_millis(20));
        progress.register_tasks(&["A", "B"]);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(display.render_count(), 0);
        assert!(!progress.is_rendering());

        progress.start_task("A");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(display.render_count() >= 1);
        assert!(progress.is_rendering());

        progress.halt();
    }

    #[tokio::test]
    async fn test_running_elapsed_increases_across_ticks() {
        let display = Arc::new(RecordingDisplay::default());
        let progress = LiveProgress::new(
            display.clone(),
            Handle::current(),
            LiveProgressOptions {
                interval: Duration::from_secs(60),
                ..Default::default()
            },
        );
        progress.register_tasks(&["A"]);
        progress.start_task("A");
        progress.halt();

        let first = progress.render_tick();
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = progress.render_tick();

        let elapsed = |line: &StatusLine| -> f64 {
            line.text
                .split(':')
                .nth(1)
                .and_then(|s| s.split_whitespace().next())
                .and_then(|s| s.parse().ok())
                .unwrap_or(-1.0)
        };
        assert!(first[0].text.contains("sec elapsed"));
        assert!(elapsed(&second[0]) > elapsed(&first[0]));
    }

    #[tokio::test]
    async fn test_done_elapsed_is_fixed() {
        let (progress, _display, clock) = live_with_clock(Duration::from_secs(60));
        progress.register_tasks(&["A"]);
        progress.start_task("A");
        clock.advance(ChronoDuration::milliseconds(2500));
        progress.stop_current_task();

        clock.advance(ChronoDuration::seconds(30));
        let lines = progress.render_tick();
        assert!(lines[0].emphasis);
        assert!(lines[0].text.contains("  2.50 sec"));
        assert!(!lines[0].text.contains("elapsed"));

        let task = &progress.snapshot()[0];
        let (Some(start), Some(end)) = (task.started_at, task.ended_at) else {
            panic!("task should have both timestamps");
        };
        assert_eq!(end - start, ChronoDuration::milliseconds(2500));
    }

    #[tokio::test]
    async fn test_halt_allows_at_most_one_extra_tick() {
        let interval = Duration::from_millis(40);
        let (progress, display, _clock) = live_with_clock(interval);
        progress.register_tasks(&["A"]);
        progress.start_task("A");

        tokio::time::sleep(Duration::from_millis(100)).await;
        progress.halt();
        let at_halt = display.render_count();

        tokio::time::sleep(interval + Duration::from_millis(30)).await;
        assert!(display.render_count() <= at_halt + 1);
        assert!(!progress.is_rendering());
    }

    #[tokio::test]
    async fn test_start_after_stop_restarts_rendering() {
        let interval = Duration::from_millis(20);
        let (progress, display, _clock) = live_with_clock(interval);
        progress.register_tasks(&["A", "B"]);

        progress.start_task("A");
        progress.stop_current_task();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!progress.is_rendering());

        let before = display.render_count();
        progress.start_task("B");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(display.render_count() > before);
        assert!(progress.is_rendering());
        assert_eq!(progress.current_index(), 1);

        progress.halt();
    }

    #[tokio::test]
    async fn test_start_task_writes_timing_record() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let timings = dir.path().join("timings.yaml");
        let display = Arc::new(RecordingDisplay::default());
        let progress = LiveProgress::new(
            display,
            Handle::current(),
            LiveProgressOptions {
                timings_path: Some(timings.clone()),
                ..Default::default()
            },
        );

        progress.register_tasks(&["A", "B"]);
        progress.start_task("A");
        progress.halt();

        let content = std::fs::read_to_string(&timings).expect("timings.yaml should exist");
        let tasks: Vec<Task> = serde_yaml::from_str(&content).expect("timings should parse");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status(), TaskStatus::Running);
        assert_eq!(tasks[1].status(), TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_task_from_blocking_thread() {
        let (progress, display, _clock) = live_with_clock(Duration::from_millis(20));
        let progress = Arc::new(progress);
        progress.register_tasks(&["A"]);

        let worker = Arc::clone(&progress);
        tokio::task::spawn_blocking(move || worker.start_task("A"))
            .await
            .expect("blocking task should not panic");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(display.render_count() >= 1);
        progress.halt();
    }
}
