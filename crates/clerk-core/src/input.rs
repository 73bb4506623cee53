//! Input declarations and bound input values
//!
//! A command declares what it accepts through an [`InputDefinition`] and
//! later reads what it was given through an [`Input`]. Values are kept as
//! `serde_json::Value` so the same input can come from a parsed command line
//! (strings) or from another command's `call` (any JSON value).
//!
//! Parsing of command-line strings is left to clap: a definition is turned
//! into a `clap::Command`, and the resulting matches are folded back into an
//! `Input`. Inputs built from name/value pairs skip clap entirely and go
//! straight to [`Input::bind`], which enforces the same rules.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, ArgMatches};
use serde_json::Value;

use crate::errors::{ConsoleError, ConsoleResult};

/// Option names the dispatcher reserves for itself.
pub const RESERVED_OPTIONS: [&str; 5] = ["help", "quiet", "verbose", "version", "no-interaction"];
pub const RESERVED_SHORTCUTS: [char; 5] = ['h', 'q', 'v', 'V', 'n'];

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSpec {
    pub name: String,
    pub required: bool,
    pub is_array: bool,
    pub description: String,
    pub default: Option<Value>,
}

impl ArgumentSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            is_array: false,
            description: String::new(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMode {
    /// `--name` alone, boolean.
    Flag,
    /// `--name <value>`.
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub shortcut: Option<char>,
    pub mode: OptionMode,
    pub description: String,
    pub default: Option<Value>,
}

impl OptionSpec {
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            mode: OptionMode::Flag,
            description: String::new(),
            default: None,
        }
    }

    pub fn value(name: impl Into<String>) -> Self {
        Self {
            mode: OptionMode::Value,
            ..Self::flag(name)
        }
    }

    pub fn shortcut(mut self, shortcut: char) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn default_for_missing(&self) -> Value {
        match (&self.default, self.mode) {
            (Some(default), _) => default.clone(),
            (None, OptionMode::Flag) => Value::Bool(false),
            (None, OptionMode::Value) => Value::Null,
        }
    }
}

/// Ordered argument and option declarations of one command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputDefinition {
    arguments: Vec<ArgumentSpec>,
    options: Vec<OptionSpec>,
}

impl InputDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an argument, replacing any earlier one with the same name.
    pub fn add_argument(&mut self, spec: ArgumentSpec) -> &mut Self {
        self.arguments.retain(|existing| existing.name != spec.name);
        self.arguments.push(spec);
        self
    }

    /// Declares an option, replacing any earlier one with the same name.
    pub fn add_option(&mut self, spec: OptionSpec) -> &mut Self {
        self.options.retain(|existing| existing.name != spec.name);
        self.options.push(spec);
        self
    }

    pub fn arguments(&self) -> &[ArgumentSpec] {
        &self.arguments
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentSpec> {
        self.arguments.iter().find(|spec| spec.name == name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.name == name)
    }

    pub fn option_by_shortcut(&self, shortcut: char) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.shortcut == Some(shortcut))
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        let mut seen_optional = false;
        for (index, spec) in self.arguments.iter().enumerate() {
            if spec.name.is_empty() {
                return Err(ConsoleError::InvalidInput(
                    "An argument name cannot be empty.".to_string(),
                ));
            }
            if spec.required && seen_optional {
                return Err(ConsoleError::InvalidInput(format!(
                    "Cannot add a required argument \"{}\" after an optional one.",
                    spec.name
                )));
            }
            if spec.is_array && index + 1 != self.arguments.len() {
                return Err(ConsoleError::InvalidInput(format!(
                    "The array argument \"{}\" must be the last argument.",
                    spec.name
                )));
            }
            seen_optional |= !spec.required;
        }

        let mut shortcuts = Vec::new();
        for spec in &self.options {
            if spec.name.is_empty() || spec.name.starts_with('-') {
                return Err(ConsoleError::InvalidInput(format!(
                    "Invalid option name \"{}\".",
                    spec.name
                )));
            }
            if RESERVED_OPTIONS.contains(&spec.name.as_str()) {
                return Err(ConsoleError::InvalidInput(format!(
                    "The option \"--{}\" is reserved.",
                    spec.name
                )));
            }
            if let Some(shortcut) = spec.shortcut {
                if RESERVED_SHORTCUTS.contains(&shortcut) || shortcuts.contains(&shortcut) {
                    return Err(ConsoleError::InvalidInput(format!(
                        "An option with shortcut \"{}\" already exists.",
                        shortcut
                    )));
                }
                shortcuts.push(shortcut);
            }
        }
        Ok(())
    }

    /// Builds the clap command used to parse this definition from argv.
    pub fn to_clap_command(&self, name: &str, about: &str) -> clap::Command {
        let mut command = clap::Command::new(name.to_string())
            .about(about.to_string())
            .disable_version_flag(true);

        for spec in &self.arguments {
            let mut arg = Arg::new(argument_id(&spec.name))
                .value_name(spec.name.clone())
                .required(spec.required)
                .help(spec.description.clone());
            if spec.is_array {
                arg = arg.num_args(1..).action(ArgAction::Append);
            } else {
                arg = arg.num_args(1).action(ArgAction::Set);
            }
            command = command.arg(arg);
        }

        for spec in &self.options {
            let mut arg = Arg::new(option_id(&spec.name))
                .long(spec.name.clone())
                .help(spec.description.clone());
            if let Some(shortcut) = spec.shortcut {
                arg = arg.short(shortcut);
            }
            arg = match spec.mode {
                OptionMode::Flag => arg.action(ArgAction::SetTrue),
                OptionMode::Value => arg
                    .num_args(1)
                    .value_name(spec.name.to_uppercase())
                    .action(ArgAction::Set),
            };
            command = command.arg(arg);
        }

        command
            .arg(
                Arg::new("quiet")
                    .short('q')
                    .long("quiet")
                    .help("Do not output any message")
                    .action(ArgAction::SetTrue)
                    .global(true),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase the verbosity of messages")
                    .action(ArgAction::Count)
                    .global(true),
            )
            .arg(
                Arg::new("no-interaction")
                    .short('n')
                    .long("no-interaction")
                    .help("Do not ask any interactive question")
                    .action(ArgAction::SetTrue)
                    .global(true),
            )
    }
}

// Arguments and options get their own clap id namespaces so neither can
// collide with the other or with the global flags.
fn argument_id(name: &str) -> String {
    format!("arg:{}", name)
}

fn option_id(name: &str) -> String {
    format!("opt:{}", name)
}

/// Dispatcher-level flags found on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    pub quiet: bool,
    pub verbose: u8,
    pub no_interaction: bool,
}

impl GlobalFlags {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            quiet: matches.get_flag("quiet"),
            verbose: matches.get_count("verbose"),
            no_interaction: matches.get_flag("no-interaction"),
        }
    }
}

/// Values handed to one command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    command: Option<String>,
    arguments: BTreeMap<String, Value>,
    options: BTreeMap<String, Value>,
    interactive: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            command: None,
            arguments: BTreeMap::new(),
            options: BTreeMap::new(),
            interactive: true,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an input from name/value pairs. Keys starting with `--` are
    /// options, `-x` is an option shortcut, `command` names the command and
    /// everything else is an argument.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut input = Self::new();
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            if let Some(name) = key.strip_prefix("--") {
                input.options.insert(name.to_string(), value);
            } else if let Some(name) = key.strip_prefix('-') {
                input.options.insert(name.to_string(), value);
            } else if key == "command" {
                input.command = value.as_str().map(str::to_string);
            } else {
                input.arguments.insert(key, value);
            }
        }
        input
    }

    /// Folds clap matches for `definition` back into an input.
    pub fn from_matches(matches: &ArgMatches, definition: &InputDefinition) -> Self {
        let mut input = Self::new();

        for spec in definition.arguments() {
            let value = if spec.is_array {
                matches.get_many::<String>(&argument_id(&spec.name)).map(|values| {
                    Value::Array(values.map(|v| Value::String(v.clone())).collect())
                })
            } else {
                matches
                    .get_one::<String>(&argument_id(&spec.name))
                    .map(|v| Value::String(v.clone()))
            };
            if let Some(value) = value {
                input.arguments.insert(spec.name.clone(), value);
            }
        }

        for spec in definition.options() {
            match spec.mode {
                OptionMode::Flag => {
                    if matches.get_flag(&option_id(&spec.name)) {
                        input.options.insert(spec.name.clone(), Value::Bool(true));
                    }
                }
                OptionMode::Value => {
                    if let Some(value) = matches.get_one::<String>(&option_id(&spec.name)) {
                        input
                            .options
                            .insert(spec.name.clone(), Value::String(value.clone()));
                    }
                }
            }
        }

        input
    }

    pub fn with_command(mut self, name: impl Into<String>) -> Self {
        self.command = Some(name.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn command_name(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn arguments(&self) -> &BTreeMap<String, Value> {
        &self.arguments
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    /// Checks this input against `definition` and fills in defaults.
    pub fn bind(&mut self, definition: &InputDefinition) -> ConsoleResult<()> {
        if let Some(unknown) = self
            .arguments
            .keys()
            .find(|name| definition.argument(name).is_none())
        {
            return Err(ConsoleError::InvalidInput(format!(
                "The \"{}\" argument does not exist.",
                unknown
            )));
        }

        let mut options = BTreeMap::new();
        for (key, value) in std::mem::take(&mut self.options) {
            let spec = match definition.option(&key) {
                Some(spec) => spec,
                None => {
                    let mut chars = key.chars();
                    match (chars.next(), chars.next()) {
                        (Some(shortcut), None) => definition
                            .option_by_shortcut(shortcut)
                            .ok_or_else(|| {
                                ConsoleError::InvalidInput(format!(
                                    "The \"-{}\" option does not exist.",
                                    key
                                ))
                            })?,
                        _ => {
                            return Err(ConsoleError::InvalidInput(format!(
                                "The \"--{}\" option does not exist.",
                                key
                            )))
                        }
                    }
                }
            };

            let value = match (spec.mode, value) {
                (OptionMode::Flag, Value::Null) => Value::Bool(true),
                (OptionMode::Flag, Value::Bool(flag)) => Value::Bool(flag),
                (OptionMode::Flag, _) => {
                    return Err(ConsoleError::InvalidInput(format!(
                        "The \"--{}\" option does not accept a value.",
                        spec.name
                    )))
                }
                (OptionMode::Value, Value::Null) => {
                    return Err(ConsoleError::InvalidInput(format!(
                        "The \"--{}\" option requires a value.",
                        spec.name
                    )))
                }
                (OptionMode::Value, value) => value,
            };
            options.insert(spec.name.clone(), value);
        }

        let missing: Vec<&str> = definition
            .arguments()
            .iter()
            .filter(|spec| spec.required && !self.arguments.contains_key(&spec.name))
            .map(|spec| spec.name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ConsoleError::InvalidInput(format!(
                "Not enough arguments (missing: \"{}\").",
                missing.join(", ")
            )));
        }

        for spec in definition.arguments() {
            self.arguments
                .entry(spec.name.clone())
                .or_insert_with(|| spec.default.clone().unwrap_or(Value::Null));
        }
        for spec in definition.options() {
            options
                .entry(spec.name.clone())
                .or_insert_with(|| spec.default_for_missing());
        }
        self.options = options;

        Ok(())
    }
}
