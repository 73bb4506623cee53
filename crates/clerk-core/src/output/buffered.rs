use std::cell::RefCell;
use std::rc::Rc;

use super::{Output, Verbosity};
use crate::progress::{ProgressEvent, ProgressIndicator, RecordingProgress};

/// In-memory output. Keeps plain text lines and progress events for later
/// inspection.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Vec<String>,
    error_lines: Vec<String>,
    verbosity: Verbosity,
    progress_events: Rc<RefCell<Vec<ProgressEvent>>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn error_lines(&self) -> &[String] {
        &self.error_lines
    }

    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    pub fn progress_events(&self) -> Vec<ProgressEvent> {
        self.progress_events.borrow().clone()
    }

    /// Number of `advance` calls seen across all progress indicators.
    pub fn progress_advances(&self) -> usize {
        self.progress_events
            .borrow()
            .iter()
            .filter(|event| matches!(event, ProgressEvent::Advanced { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.error_lines.clear();
        self.progress_events.borrow_mut().clear();
    }
}

impl Output for BufferedOutput {
    fn do_write(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn do_write_error(&mut self, line: &str) {
        self.error_lines.push(line.to_string());
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    fn progress_bar(&mut self, max: u64) -> Box<dyn ProgressIndicator> {
        Box::new(RecordingProgress::new(max, self.progress_events.clone()))
    }
}
