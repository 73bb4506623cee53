//! The running command's view of the world
//!
//! A [`Context`] is created for each invocation and handed to
//! [`Command::handle`](crate::command::Command::handle). It bundles the bound
//! input, the shared output and the owning application, and carries the
//! helpers command bodies use: formatted messages, input accessors, prompts,
//! tables, progress bars and calls into other commands.

use std::fmt::Write as _;

use chrono::Local;
use serde_json::Value;

use crate::application::Application;
use crate::command::CommandDefinition;
use crate::errors::{ConsoleResult, ExitStatus};
use crate::input::Input;
use crate::output::{MessageKind, Output, Verbosity};
use crate::progress::ProgressIndicator;
use crate::prompt::{ChoiceQuestion, Question};
use crate::table::Table;

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Context<'a> {
    app: &'a mut Application,
    input: &'a mut Input,
    output: &'a mut dyn Output,
    definition: &'a CommandDefinition,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        app: &'a mut Application,
        input: &'a mut Input,
        output: &'a mut dyn Output,
        definition: &'a CommandDefinition,
    ) -> Self {
        Self {
            app,
            input,
            output,
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &CommandDefinition {
        self.definition
    }

    pub fn application(&mut self) -> &mut Application {
        self.app
    }

    pub fn input(&self) -> &Input {
        &*self.input
    }

    pub fn input_mut(&mut self) -> &mut Input {
        self.input
    }

    pub fn output(&mut self) -> &mut dyn Output {
        self.output
    }

    pub fn is_interactive(&self) -> bool {
        self.input.is_interactive()
    }

    // Messages

    /// Current local time in the application's datetime format.
    pub fn current_datetime(&self) -> String {
        self.current_datetime_with(&self.app.config().datetime_format)
    }

    pub fn current_datetime_with(&self, format: &str) -> String {
        let now = Local::now();
        let mut text = String::new();
        if write!(text, "{}", now.format(format)).is_err() {
            text.clear();
            let _ = write!(text, "{}", now.format(DEFAULT_DATETIME_FORMAT));
        }
        text
    }

    fn formatted_line(&mut self, kind: MessageKind, message: &str) {
        let section = if self.definition.message_timestamp {
            self.current_datetime()
        } else {
            kind.tag().to_uppercase()
        };
        let line = format!("[{}] {}", section, kind.wrap(message));
        self.output.writeln(&line);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.formatted_line(MessageKind::Info, message.as_ref());
    }

    pub fn comment(&mut self, message: impl AsRef<str>) {
        self.formatted_line(MessageKind::Comment, message.as_ref());
    }

    pub fn question(&mut self, message: impl AsRef<str>) {
        self.formatted_line(MessageKind::Question, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.formatted_line(MessageKind::Error, message.as_ref());
    }

    /// Unstyled line, prefixed with the time when timestamps are on.
    pub fn line(&mut self, message: impl AsRef<str>) {
        let line = if self.definition.message_timestamp {
            format!("[{}] {}", self.current_datetime(), message.as_ref())
        } else {
            message.as_ref().to_string()
        };
        self.output.writeln(&line);
    }

    /// Writes `count` blank lines, at least one.
    pub fn new_line(&mut self, count: usize) {
        for _ in 0..count.max(1) {
            self.line("");
        }
    }

    /// Writes a padded error block with a section line and a message line.
    pub fn error_block(&mut self, section: &str, message: &str, label_off: bool) {
        let label = if self.definition.message_timestamp && !label_off {
            format!("{}] ", self.current_datetime())
        } else {
            String::new()
        };
        let lines = [format!("{}{}", label, section), format!("{}{}", label, message)];
        let width = lines
            .iter()
            .map(|line| console::measure_text_width(line))
            .max()
            .unwrap_or(0);

        let blank = " ".repeat(width + 4);
        self.output.writeln(&MessageKind::Error.wrap(&blank));
        for line in &lines {
            let padded = format!("  {}  ", console::pad_str(line, width, console::Alignment::Left, None));
            self.output.writeln(&MessageKind::Error.wrap(&padded));
        }
        self.output.writeln(&MessageKind::Error.wrap(&blank));
    }

    // Input

    /// The named argument, or `default` when it is missing or null.
    pub fn argument(&self, name: &str, default: impl Into<Value>) -> Value {
        match self.input.argument(name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default.into(),
        }
    }

    /// The named option, or `default` when it is missing or null.
    pub fn option(&self, name: &str, default: impl Into<Value>) -> Value {
        match self.input.option(name) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default.into(),
        }
    }

    pub fn argument_str(&self, name: &str) -> Option<&str> {
        self.input.argument(name).and_then(Value::as_str)
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.input.option(name).and_then(Value::as_str)
    }

    /// Whether a flag option was given.
    pub fn flag(&self, name: &str) -> bool {
        self.input
            .option(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn arguments(&self) -> serde_json::Map<String, Value> {
        self.input
            .arguments()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn options(&self) -> serde_json::Map<String, Value> {
        self.input
            .options()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    // Prompts

    pub fn ask(&mut self, question: &str, default: Option<&str>) -> ConsoleResult<Option<String>> {
        let mut prompt = Question::new(question);
        prompt.default = default.map(str::to_string);
        self.prompt(&prompt)
    }

    /// Like [`ask`](Self::ask) but the answer is not echoed.
    pub fn secret(&mut self, question: &str, default: Option<&str>) -> ConsoleResult<Option<String>> {
        let mut prompt = Question::new(question).hidden();
        prompt.default = default.map(str::to_string);
        self.prompt(&prompt)
    }

    fn prompt(&mut self, question: &Question) -> ConsoleResult<Option<String>> {
        if !self.input.is_interactive() {
            return Ok(question.default.clone());
        }
        self.app.prompter_mut().ask(question)
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> ConsoleResult<bool> {
        if !self.input.is_interactive() {
            return Ok(default);
        }
        self.app.prompter_mut().confirm(question, default)
    }

    /// Asks until one of the choices is picked.
    ///
    /// Each invalid answer prints the question's error message. Once
    /// `max_attempts` invalid answers have been given the input is switched to
    /// non-interactive and the default is returned. Single-select questions
    /// return one value.
    pub fn choice(&mut self, question: &ChoiceQuestion) -> ConsoleResult<Vec<String>> {
        let default = question.effective_default();
        let prompt = Question {
            text: question.render_prompt(),
            default: question.default.clone(),
            hidden: false,
        };

        let mut attempts = 0;
        loop {
            if !self.input.is_interactive() {
                return Ok(default.unwrap_or_default());
            }

            let answer = self.app.prompter_mut().ask(&prompt)?;
            match answer {
                Some(answer) => match question.resolve(&answer) {
                    Some(values) => return Ok(values),
                    None => self.error(question.invalid_message(&answer)),
                },
                None => match &default {
                    Some(values) => return Ok(values.clone()),
                    None => self.error(question.invalid_message("")),
                },
            }

            attempts += 1;
            if question.max_attempts.is_some_and(|max| attempts >= max) {
                self.input.set_interactive(false);
            }
        }
    }

    // Tables

    /// Renders `rows` under `headers`. Every row must be a JSON array.
    pub fn table<I, S>(&mut self, headers: I, rows: &[Value]) -> ConsoleResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = Table::from_values(headers, rows)?;
        self.render_table(&table);
        Ok(())
    }

    /// Renders arbitrary rows after mapping each one into cells.
    pub fn table_with<I, S, R, T, F>(&mut self, headers: I, rows: R, mut mapper: F) -> ConsoleResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = T>,
        F: FnMut(T) -> Vec<Value>,
    {
        let mut table = Table::new(headers);
        for row in rows {
            table.add_value_row(&mapper(row))?;
        }
        self.render_table(&table);
        Ok(())
    }

    pub fn render_table(&mut self, table: &Table) {
        for line in table.render() {
            self.output.writeln(&line);
        }
    }

    // Progress

    pub fn create_progress_bar(&mut self, max: u64) -> Box<dyn ProgressIndicator> {
        self.output.progress_bar(max)
    }

    /// Runs `callback(cx, value, index)` for each item, advancing a progress
    /// bar after every item. A non-zero `max_steps` overrides the item count.
    pub fn with_progress_bar<I, T, F>(&mut self, data: I, mut callback: F, max_steps: u64) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&mut Self, T, usize) -> anyhow::Result<()>,
    {
        let items: Vec<T> = data.into_iter().collect();
        let mut progress = self.output.progress_bar(items.len() as u64);
        if max_steps > 0 {
            progress.set_max_steps(max_steps);
        }

        progress.start();
        let result = items
            .into_iter()
            .enumerate()
            .try_for_each(|(index, item)| -> anyhow::Result<()> {
                callback(self, item, index)?;
                progress.advance(1);
                Ok(())
            });
        progress.finish();
        result
    }

    // Calls

    /// Runs another command with the same output.
    pub fn call(&mut self, name: &str, input: Input) -> ConsoleResult<ExitStatus> {
        let input = if self.input.is_interactive() {
            input
        } else {
            input.with_interactive(false)
        };
        self.app.call(name, input, &mut *self.output)
    }

    /// Runs another command with the shared output silenced for the duration
    /// of the call.
    pub fn call_silently(&mut self, name: &str, input: Input) -> ConsoleResult<ExitStatus> {
        let verbosity = self.output.verbosity();
        self.output.set_verbosity(Verbosity::Quiet);
        let result = self.call(name, input);
        self.output.set_verbosity(verbosity);
        result
    }
}
