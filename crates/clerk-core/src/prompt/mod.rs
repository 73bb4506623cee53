//! Interactive prompt capability
//!
//! Commands ask questions through a [`Prompter`]. The terminal implementation
//! uses `dialoguer`; [`ScriptedPrompter`] answers from a queue so command
//! bodies that ask questions can be exercised without a terminal.
//!
//! Choice questions are resolved on top of plain `ask` calls by the running
//! context, which owns the retry and fallback rules.

mod interactive;
mod scripted;

pub use interactive::DialoguerPrompter;
pub use scripted::ScriptedPrompter;

use crate::errors::ConsoleResult;

/// A free-text question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub default: Option<String>,
    pub hidden: bool,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            default: None,
            hidden: false,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Asks for input without echoing it.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

pub trait Prompter {
    /// Asks `question`. `None` means the user gave no answer.
    fn ask(&mut self, question: &Question) -> ConsoleResult<Option<String>>;

    fn confirm(&mut self, prompt: &str, default: bool) -> ConsoleResult<bool>;
}

/// A question answered by picking one or more entries of a keyed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub text: String,
    /// `(key, value)` pairs in display order.
    pub choices: Vec<(String, String)>,
    pub default: Option<String>,
    pub max_attempts: Option<u32>,
    pub multiselect: bool,
    pub error_message: String,
}

impl ChoiceQuestion {
    /// Builds a question whose keys are the zero-based positions of `values`.
    pub fn new<I, S>(text: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value.into()))
            .collect();
        Self::keyed(text, choices)
    }

    pub fn keyed(text: impl Into<String>, choices: Vec<(String, String)>) -> Self {
        Self {
            text: text.into(),
            choices,
            default: None,
            max_attempts: None,
            multiselect: false,
            error_message: "Invalid value: \"{}\"".to_string(),
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn multiselect(mut self) -> Self {
        self.multiselect = true;
        self
    }

    /// Error shown for an invalid answer. `{}` is replaced by the answer.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// The values that apply when the question can't be answered. With a
    /// bounded number of attempts and no explicit default, the first choice
    /// is used. A default naming a key resolves to that key's value.
    pub fn effective_default(&self) -> Option<Vec<String>> {
        match (&self.default, self.max_attempts) {
            (Some(default), _) => {
                Some(self.resolve(default).unwrap_or_else(|| vec![default.clone()]))
            }
            (None, Some(_)) => self.choices.first().map(|(_, value)| vec![value.clone()]),
            (None, None) => None,
        }
    }

    /// Resolves a raw answer to choice values, or `None` when any part of it
    /// matches neither a key nor a value.
    pub fn resolve(&self, answer: &str) -> Option<Vec<String>> {
        let parts: Vec<&str> = if self.multiselect {
            answer.split(',').map(str::trim).collect()
        } else {
            vec![answer.trim()]
        };

        parts
            .into_iter()
            .map(|part| {
                self.choices
                    .iter()
                    .find(|(key, value)| key == part || value == part)
                    .map(|(_, value)| value.clone())
            })
            .collect()
    }

    pub fn invalid_message(&self, answer: &str) -> String {
        self.error_message.replacen("{}", answer, 1)
    }

    /// Prompt text including the list of choices.
    pub fn render_prompt(&self) -> String {
        let mut text = self.text.clone();
        for (key, value) in &self.choices {
            text.push_str(&format!("\n  [{}] {}", key, value));
        }
        text
    }
}
