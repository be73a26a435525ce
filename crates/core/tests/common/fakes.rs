//! Test doubles for the workflow's collaborators.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uoi_core::container::{ContainerRuntime, RuntimeError, RuntimeResult};
use uoi_core::display::{ErrorNotifier, StatusDisplay};
use uoi_core::install::{InstallError, STATUS_ARTIFACT_COMMAND};
use uoi_core::progress::ProgressReporter;
use uoi_protocol::StatusLine;

pub const CLEAN_ARTIFACT: &str = r#"{"v1": {"datasource": "DataSourceNoCloud", "errors": []}}"#;

/// One scripted answer to a status artifact read.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum ArtifactRead {
    /// The container cannot be reached yet.
    Unreachable,
    /// The read succeeds with this content.
    Content(String),
}

/// Container runtime that records every call and answers from a script.
///
/// Status artifact reads pop from the readiness script; once it is empty
/// they return a clean artifact. Any command containing `fail_on` fails.
#[derive(Default)]
pub struct FakeRuntime {
    calls: Mutex<Vec<String>>,
    readiness: Mutex<VecDeque<ArtifactRead>>,
    fail_on: Option<String>,
    artifact_reads: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readiness(mut self, script: Vec<ArtifactRead>) -> Self {
        self.readiness = Mutex::new(script.into());
        self
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn artifact_reads(&self) -> usize {
        self.artifact_reads.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) -> RuntimeResult<()> {
        let failing = self
            .fail_on
            .as_deref()
            .is_some_and(|fragment| call.contains(fragment));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
        if failing {
            return Err(RuntimeError::CommandFailed {
                command: call,
                code: Some(1),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn create(&self, name: &str, userdata: &Path) -> RuntimeResult<()> {
        self.record(format!("create {} {}", name, file_name(userdata)))
    }

    async fn start(&self, name: &str) -> RuntimeResult<()> {
        self.record(format!("start {}", name))
    }

    async fn wait_until_running(&self, name: &str) -> RuntimeResult<()> {
        self.record(format!("wait {}", name))
    }

    async fn run(&self, name: &str, command: &str) -> RuntimeResult<Vec<u8>> {
        self.record(format!("run {}", command))?;
        if command != STATUS_ARTIFACT_COMMAND {
            return Ok(Vec::new());
        }

        self.artifact_reads.fetch_add(1, Ordering::SeqCst);
        let next = self
            .readiness
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        match next {
            Some(ArtifactRead::Unreachable) => Err(RuntimeError::NotResponsive {
                name: name.to_string(),
            }),
            Some(ArtifactRead::Content(content)) => Ok(content.into_bytes()),
            None => Ok(CLEAN_ARTIFACT.as_bytes().to_vec()),
        }
    }

    async fn copy(&self, _name: &str, src: &Path, dest: &str) -> RuntimeResult<()> {
        self.record(format!("copy {} {}", file_name(src), dest))
    }

    async fn run_status(&self, _name: &str, command: &str) -> RuntimeResult<()> {
        self.record(format!("run_status {}", command))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Progress reporter double that records each call.
#[derive(Default)]
pub struct RecordingProgress {
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingProgress {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ProgressReporter for RecordingProgress {
    fn register_tasks(&self, names: &[&str]) {
        self.push(format!("register {}", names.join(",")));
    }

    fn start_task(&self, name: &str) {
        self.push(format!("start {}", name));
    }

    fn stop_current_task(&self) {
        self.push("stop".to_string());
    }

    fn halt(&self) {
        self.push("halt".to_string());
    }
}

/// Display double keeping every message and rendered frame.
#[derive(Default)]
pub struct RecordingDisplay {
    messages: Mutex<Vec<String>>,
    frames: Mutex<Vec<Vec<StatusLine>>>,
    status_watch_starts: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn frames(&self) -> Vec<Vec<StatusLine>> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn status_watch_starts(&self) -> usize {
        self.status_watch_starts.load(Ordering::SeqCst)
    }
}

impl StatusDisplay for RecordingDisplay {
    fn render_progress(&self, lines: Vec<StatusLine>) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(lines);
        }
    }

    fn info_message(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }

    fn status_watch_starting(&self) {
        self.status_watch_starts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notifier double keeping the rendered text of every error.
#[derive(Default)]
pub struct RecordingNotifier {
    errors: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn notify(&self, error: &InstallError) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error.to_string());
        }
    }
}
