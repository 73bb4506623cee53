use ::console::Term;

use super::{Output, Verbosity};
use crate::progress::{IndicatifProgress, ProgressIndicator};

/// Output bound to the process's stdout and stderr.
pub struct ConsoleOutput {
    stdout: Term,
    stderr: Term,
    verbosity: Verbosity,
    decorated: bool,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self::with_verbosity(Verbosity::Normal)
    }

    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self {
            stdout: Term::stdout(),
            stderr: Term::stderr(),
            verbosity,
            decorated: ::console::colors_enabled(),
        }
    }

    pub fn set_decorated(&mut self, decorated: bool) {
        self.decorated = decorated;
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for ConsoleOutput {
    fn do_write(&mut self, line: &str) {
        if let Err(e) = self.stdout.write_line(line) {
            log::warn!("Failed to write to stdout: {}", e);
        }
    }

    fn do_write_error(&mut self, line: &str) {
        if let Err(e) = self.stderr.write_line(line) {
            log::warn!("Failed to write to stderr: {}", e);
        }
    }

    fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    fn is_decorated(&self) -> bool {
        self.decorated
    }

    fn progress_bar(&mut self, max: u64) -> Box<dyn ProgressIndicator> {
        Box::new(IndicatifProgress::new(max, self.is_quiet()))
    }
}
