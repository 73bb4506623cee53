//! Output capability for commands
//!
//! Commands never print directly. Every line goes through an [`Output`], which
//! decides whether the line is shown (verbosity), how it is shown (styled or
//! plain) and where it goes (terminal or memory). The same output instance is
//! shared by a command and every command it calls, so lowering its verbosity
//! silences a whole call tree at once.

mod buffered;
mod terminal;
pub mod markup;

pub use self::buffered::BufferedOutput;
pub use self::terminal::ConsoleOutput;
pub use markup::MessageKind;

use serde::{Deserialize, Serialize};

use crate::progress::ProgressIndicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    VeryVerbose,
    Debug,
}

impl Verbosity {
    /// Maps the number of `-v` flags to a level.
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            2 => Verbosity::VeryVerbose,
            _ => Verbosity::Debug,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" | "very-verbose" => Some(Verbosity::VeryVerbose),
            "debug" => Some(Verbosity::Debug),
            _ => None,
        }
    }
}

pub trait Output {
    /// Writes one already rendered line.
    fn do_write(&mut self, line: &str);

    /// Writes one line to the error channel. Error lines ignore verbosity.
    fn do_write_error(&mut self, line: &str) {
        self.do_write(line);
    }

    fn verbosity(&self) -> Verbosity;

    fn set_verbosity(&mut self, verbosity: Verbosity);

    fn is_decorated(&self) -> bool {
        false
    }

    /// Creates a progress indicator drawing to this output.
    fn progress_bar(&mut self, max: u64) -> Box<dyn ProgressIndicator>;

    fn is_quiet(&self) -> bool {
        self.verbosity() == Verbosity::Quiet
    }

    /// Writes `message` if the output is at least as verbose as `level`.
    fn writeln_at(&mut self, message: &str, level: Verbosity) {
        if self.verbosity() == Verbosity::Quiet || self.verbosity() < level {
            return;
        }
        let rendered = markup::render(message, self.is_decorated());
        self.do_write(&rendered);
    }

    fn writeln(&mut self, message: &str) {
        self.writeln_at(message, Verbosity::Normal);
    }

    fn write_error(&mut self, message: &str) {
        let rendered = markup::render(message, self.is_decorated());
        self.do_write_error(&rendered);
    }
}
