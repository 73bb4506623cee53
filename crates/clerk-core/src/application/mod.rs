//! Command registry and dispatcher
//!
//! An [`Application`] owns every command it knows about and runs them by
//! name. Commands can be registered in three ways:
//!
//! - eagerly, as an already constructed instance ([`Application::add`]);
//! - lazily, as a [`LazyCommand`] whose factory runs on first use;
//! - as closure builders ([`Application::command`]), which are compiled into
//!   a [`FactoryCommandLoader`] and built on first use as well.
//!
//! Whatever the registration, a command is constructed at most once per
//! application and kept in its slot afterwards. While a command runs it is
//! taken out of its slot, which is what lets it call other commands through
//! the same application. Calling a command that is already running is an
//! error.

mod list;
mod loader;

pub use list::{ListCommand, LIST_COMMAND};
pub use loader::{CommandLoader, FactoryCommandLoader};

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use clap::error::ErrorKind;

use crate::builder::CommandBuilder;
use crate::command::{execute, Command, CommandClass, CommandDefinition, CommandType, LazyCommand};
use crate::config::ConsoleConfig;
use crate::context::Context;
use crate::errors::{ConsoleError, ConsoleResult, ExitStatus};
use crate::input::{GlobalFlags, Input};
use crate::lock::{FileLockProvider, LockProvider};
use crate::output::{MessageKind, Output, Verbosity};
use crate::prompt::{DialoguerPrompter, Prompter};

/// Lifecycle of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Unconfigured,
    Configuring,
    Ready,
    Running,
}

/// Listing entry for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    pub name: String,
    pub description: String,
    pub hidden: bool,
}

impl CommandSummary {
    /// The first `levels` segments of the name's namespace, i.e. of every
    /// segment but the last. `None` for names without a `:`.
    pub fn namespace_at(&self, levels: usize) -> Option<&str> {
        let (namespace, _) = self.name.rsplit_once(':')?;
        let end = namespace
            .match_indices(':')
            .nth(levels.saturating_sub(1))
            .map_or(namespace.len(), |(index, _)| index);
        Some(&namespace[..end])
    }

    /// The top-level namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace_at(1)
    }

    /// Whether the command lives in `namespace` or one of its children.
    pub fn in_namespace(&self, namespace: &str) -> bool {
        let levels = namespace.matches(':').count() + 1;
        self.namespace_at(levels) == Some(namespace)
    }
}

impl From<&CommandDefinition> for CommandSummary {
    fn from(definition: &CommandDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            hidden: definition.hidden,
        }
    }
}

struct LoadedCommand {
    command: Box<dyn Command>,
    definition: CommandDefinition,
}

impl LoadedCommand {
    fn load(command: Box<dyn Command>) -> Self {
        let definition = command.configure();
        Self {
            command,
            definition,
        }
    }
}

enum Slot {
    Ready(LoadedCommand),
    Lazy(LazyCommand),
    Running(CommandDefinition),
}

pub struct Application {
    config: ConsoleConfig,
    slots: BTreeMap<String, Slot>,
    pending_closures: BTreeMap<String, CommandBuilder>,
    closure_loader: Option<FactoryCommandLoader>,
    closures_changed: bool,
    /// Running commands re-registered mid-run, dropped once they return.
    replaced: BTreeSet<String>,
    command_loader: Option<Box<dyn CommandLoader>>,
    default_command: Option<String>,
    prompter: Box<dyn Prompter>,
    lock_provider: Box<dyn LockProvider>,
    state: AppState,
}

impl Application {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::from_config(ConsoleConfig::new(name, version))
    }

    /// An application with the default name and version.
    pub fn make() -> Self {
        Self::from_config(ConsoleConfig::default())
    }

    pub fn from_config(config: ConsoleConfig) -> Self {
        let lock_dir = config.lock_dir.clone().unwrap_or_else(std::env::temp_dir);
        Self {
            config,
            slots: BTreeMap::new(),
            pending_closures: BTreeMap::new(),
            closure_loader: None,
            closures_changed: false,
            replaced: BTreeSet::new(),
            command_loader: None,
            default_command: None,
            prompter: Box::new(DialoguerPrompter::new()),
            lock_provider: Box::new(FileLockProvider::new(lock_dir)),
            state: AppState::Unconfigured,
        }
    }

    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_lock_provider(mut self, lock_provider: Box<dyn LockProvider>) -> Self {
        self.lock_provider = lock_provider;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Name and version as shown by `--version`.
    pub fn long_version(&self) -> String {
        format!("{} {}", self.config.name, MessageKind::Info.wrap(&self.config.version))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn prompter_mut(&mut self) -> &mut dyn Prompter {
        self.prompter.as_mut()
    }

    pub fn set_prompter(&mut self, prompter: Box<dyn Prompter>) {
        self.prompter = prompter;
    }

    pub fn lock_provider_mut(&mut self) -> &mut dyn LockProvider {
        self.lock_provider.as_mut()
    }

    pub fn set_lock_provider(&mut self, lock_provider: Box<dyn LockProvider>) {
        self.lock_provider = lock_provider;
    }

    // Registration

    /// Registers a closure command. A later registration under the same name
    /// replaces the earlier one.
    pub fn command<F>(&mut self, name: impl Into<String>, callback: F) -> &mut CommandBuilder
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        let builder = CommandBuilder::new(name.clone(), callback);
        self.insert_builder(name, builder)
    }

    /// Registers an existing closure builder.
    pub fn add_builder(&mut self, builder: CommandBuilder) -> &mut CommandBuilder {
        self.insert_builder(builder.name().to_string(), builder)
    }

    fn insert_builder(&mut self, name: String, builder: CommandBuilder) -> &mut CommandBuilder {
        self.closures_changed = true;
        let running = matches!(self.slots.get(&name), Some(Slot::Running(_)));
        if running {
            self.replaced.insert(name.clone());
        } else {
            self.slots.remove(&name);
        }
        match self.pending_closures.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(builder);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(builder),
        }
    }

    /// Registers a constructed command.
    pub fn add(&mut self, command: Box<dyn Command>) -> &mut Self {
        let loaded = LoadedCommand::load(command);
        log::debug!("Registered command '{}'", loaded.definition.name);
        self.slots
            .insert(loaded.definition.name.clone(), Slot::Ready(loaded));
        self
    }

    /// Registers a command that is built on first use.
    pub fn add_lazy(&mut self, command: LazyCommand) -> &mut Self {
        log::debug!("Registered lazy command '{}'", command.name());
        self.slots
            .insert(command.name().to_string(), Slot::Lazy(command));
        self
    }

    /// Registers command types, either as lazy descriptors or by constructing
    /// each one right away.
    pub fn register_commands(&mut self, commands: &[CommandType], lazy_load: bool) -> &mut Self {
        for command_type in commands {
            if lazy_load {
                self.add_lazy(command_type.lazy());
            } else {
                self.add(command_type.create());
            }
        }
        self
    }

    pub fn with_commands(mut self, commands: &[CommandType], lazy_load: bool) -> Self {
        self.register_commands(commands, lazy_load);
        self
    }

    /// Constructs and registers `T` and runs it when no command name is given.
    pub fn with_default_command<T: CommandClass>(mut self) -> Self {
        self.add(Box::new(T::create()));
        self.default_command = Some(T::NAME.to_string());
        self
    }

    pub fn set_default_command(&mut self, name: impl Into<String>) -> &mut Self {
        self.default_command = Some(name.into());
        self
    }

    pub fn default_command(&self) -> Option<&str> {
        self.default_command.as_deref()
    }

    /// Compiles the registered closure builders into a loader.
    pub fn closure_command_loader(&self) -> FactoryCommandLoader {
        let mut loader = FactoryCommandLoader::new();
        for (name, builder) in &self.pending_closures {
            let builder = builder.clone();
            loader.insert(
                name.clone(),
                Rc::new(move || Box::new(builder.build()) as Box<dyn Command>),
            );
        }
        loader
    }

    pub fn set_command_loader(&mut self, loader: Box<dyn CommandLoader>) -> &mut Self {
        self.command_loader = Some(loader);
        self
    }

    fn install_closure_loader(&mut self) {
        if !self.closures_changed {
            return;
        }
        let loader = self.closure_command_loader();
        log::debug!("Installed closure command loader with {} commands", loader.len());
        self.closure_loader = Some(loader);
        self.closures_changed = false;
    }

    fn ensure_configured(&mut self) {
        if self.state != AppState::Unconfigured {
            return;
        }
        self.state = AppState::Configuring;
        if !self.slots.contains_key(LIST_COMMAND) {
            self.add_lazy(ListCommand::lazy_command());
        }
        self.install_closure_loader();
        self.state = AppState::Ready;
    }

    // Lookup

    pub fn has(&self, name: &str) -> bool {
        self.slots.contains_key(name)
            || self.pending_closures.contains_key(name)
            || self
                .command_loader
                .as_ref()
                .is_some_and(|loader| loader.has(name))
    }

    /// Every registered name, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.slots.keys().cloned().collect();
        names.extend(self.pending_closures.keys().cloned());
        if let Some(loader) = &self.command_loader {
            names.extend(loader.names());
        }
        names.into_iter().collect()
    }

    /// Builds the command registered as `name` unless it already exists.
    fn resolve(&mut self, name: &str) -> ConsoleResult<()> {
        self.install_closure_loader();

        let command = match self.slots.get(name) {
            Some(Slot::Ready(_)) | Some(Slot::Running(_)) => return Ok(()),
            Some(Slot::Lazy(lazy)) => lazy.create(),
            None => {
                if let Some(loader) = self.closure_loader.as_ref().filter(|l| l.has(name)) {
                    loader.get(name)?
                } else if let Some(loader) = self.command_loader.as_ref().filter(|l| l.has(name)) {
                    loader.get(name)?
                } else {
                    return Err(ConsoleError::CommandNotFound(name.to_string()));
                }
            }
        };

        log::debug!("Constructed command '{}'", name);
        self.slots
            .insert(name.to_string(), Slot::Ready(LoadedCommand::load(command)));
        Ok(())
    }

    /// Definition of the command registered as `name`, building it if needed.
    pub fn find(&mut self, name: &str) -> ConsoleResult<&CommandDefinition> {
        self.ensure_configured();
        self.resolve(name)?;
        match self.slots.get(name) {
            Some(Slot::Ready(loaded)) => Ok(&loaded.definition),
            Some(Slot::Running(definition)) => Ok(definition),
            _ => Err(ConsoleError::CommandNotFound(name.to_string())),
        }
    }

    /// Summaries of all commands, in name order. Lazy commands are described
    /// from their descriptors and stay unbuilt.
    pub fn all(&mut self) -> ConsoleResult<Vec<CommandSummary>> {
        self.ensure_configured();
        let mut summaries = Vec::new();
        for name in self.names() {
            if !self.slots.contains_key(&name) {
                self.resolve(&name)?;
            }
            let summary = match self.slots.get(&name) {
                Some(Slot::Ready(loaded)) => CommandSummary::from(&loaded.definition),
                Some(Slot::Running(definition)) => CommandSummary::from(definition),
                Some(Slot::Lazy(lazy)) => CommandSummary {
                    name: name.clone(),
                    description: lazy.description().to_string(),
                    hidden: lazy.is_hidden(),
                },
                None => continue,
            };
            summaries.push(summary);
        }
        Ok(summaries)
    }

    fn take(&mut self, name: &str) -> ConsoleResult<LoadedCommand> {
        self.resolve(name)?;
        match self.slots.remove(name) {
            Some(Slot::Ready(loaded)) => {
                self.slots
                    .insert(name.to_string(), Slot::Running(loaded.definition.clone()));
                Ok(loaded)
            }
            Some(slot @ Slot::Running(_)) => {
                self.slots.insert(name.to_string(), slot);
                Err(ConsoleError::CommandRunning(name.to_string()))
            }
            Some(slot) => {
                self.slots.insert(name.to_string(), slot);
                Err(ConsoleError::CommandNotFound(name.to_string()))
            }
            None => Err(ConsoleError::CommandNotFound(name.to_string())),
        }
    }

    // Dispatch

    /// Runs the command named by `input` (or the default command) and
    /// returns its status. Dispatch failures are returned as errors.
    pub fn do_run(&mut self, mut input: Input, output: &mut dyn Output) -> ConsoleResult<ExitStatus> {
        self.ensure_configured();
        let name = match input.command_name() {
            Some(name) => name.to_string(),
            None => self
                .default_command
                .clone()
                .unwrap_or_else(|| LIST_COMMAND.to_string()),
        };
        log::debug!("Dispatching command '{}'", name);

        let mut loaded = self.take(&name)?;
        let previous = std::mem::replace(&mut self.state, AppState::Running);
        let result = self.execute_loaded(&mut loaded, &mut input, output);
        self.state = previous;
        if self.replaced.remove(&name) {
            self.slots.remove(&name);
        } else {
            self.slots.insert(name, Slot::Ready(loaded));
        }
        result
    }

    fn execute_loaded(
        &mut self,
        loaded: &mut LoadedCommand,
        input: &mut Input,
        output: &mut dyn Output,
    ) -> ConsoleResult<ExitStatus> {
        loaded.definition.input.validate()?;
        input.bind(&loaded.definition.input)?;

        let LoadedCommand {
            command,
            definition,
        } = loaded;
        let mut cx = Context::new(self, input, output, definition);
        Ok(execute(command.as_mut(), &mut cx))
    }

    /// Runs `name` with `input` through this application.
    pub fn call(&mut self, name: &str, input: Input, output: &mut dyn Output) -> ConsoleResult<ExitStatus> {
        self.do_run(input.with_command(name), output)
    }

    /// Parses `args` (program name first) and runs the selected command.
    /// Every failure is reported on `output` and becomes
    /// [`ExitStatus::Failure`].
    pub fn run<I, T>(&mut self, args: I, output: &mut dyn Output) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).skip(1).collect();
        match self.run_args(args, output) {
            Ok(status) => status,
            Err(e) => {
                output.write_error(&MessageKind::Error.wrap(&e.to_string()));
                log::error!("{}", e);
                ExitStatus::Failure
            }
        }
    }

    fn run_args(&mut self, args: Vec<String>, output: &mut dyn Output) -> ConsoleResult<ExitStatus> {
        self.ensure_configured();

        if args.iter().any(|arg| arg == "-V" || arg == "--version") {
            output.writeln(&self.long_version());
            return Ok(ExitStatus::Success);
        }

        let position = args.iter().position(|arg| !arg.starts_with('-'));
        let (name, rest) = match position {
            Some(index) if self.has(&args[index]) || self.default_command.is_none() => {
                let mut rest = args.clone();
                let name = rest.remove(index);
                (name, rest)
            }
            _ => {
                let name = self
                    .default_command
                    .clone()
                    .unwrap_or_else(|| LIST_COMMAND.to_string());
                (name, args)
            }
        };

        let definition = self.find(&name)?.clone();
        definition.input.validate()?;

        let clap_command = definition
            .input
            .to_clap_command(&name, &definition.description);
        let matches = match clap_command.try_get_matches_from(std::iter::once(name.clone()).chain(rest)) {
            Ok(matches) => matches,
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    for line in e.render().to_string().lines() {
                        output.writeln(line);
                    }
                    return Ok(ExitStatus::Success);
                }
                _ => {
                    let rendered = e.render().to_string();
                    let message = rendered
                        .lines()
                        .next()
                        .unwrap_or_default()
                        .trim_start_matches("error: ")
                        .to_string();
                    return Err(ConsoleError::InvalidInput(message));
                }
            },
        };

        let flags = GlobalFlags::from_matches(&matches);
        let verbosity = if flags.quiet {
            Verbosity::Quiet
        } else if flags.verbose > 0 {
            Verbosity::from_occurrences(flags.verbose)
        } else {
            self.config.verbosity
        };
        output.set_verbosity(verbosity);

        let input = Input::from_matches(&matches, &definition.input)
            .with_command(name)
            .with_interactive(!flags.no_interaction);
        self.do_run(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ArgumentSpec, OptionSpec};
    use crate::lock::MemoryLockProvider;
    use crate::output::BufferedOutput;
    use crate::prompt::ScriptedPrompter;
    use serde_json::json;
    use std::cell::Cell;

    thread_local! {
        static GREETERS: Cell<usize> = const { Cell::new(0) };
    }

    struct Greeter;

    impl CommandClass for Greeter {
        const NAME: &'static str = "example:greet";
        const DESCRIPTION: &'static str = "Greets someone";
        const MESSAGE_TIMESTAMP: bool = false;

        fn create() -> Self {
            GREETERS.with(|count| count.set(count.get() + 1));
            Greeter
        }

        fn init(&self, definition: &mut crate::input::InputDefinition) {
            definition
                .add_argument(ArgumentSpec::optional("name").default_value("world"))
                .add_option(OptionSpec::flag("yell").shortcut('y'));
        }

        fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
            let name = cx.argument("name", "world");
            let mut message = format!("Hello {}", name.as_str().unwrap_or_default());
            if cx.flag("yell") {
                message = message.to_uppercase();
            }
            cx.info(message);
            Ok(())
        }
    }

    fn test_app() -> Application {
        Application::new("Test App", "2.0")
            .with_prompter(Box::new(ScriptedPrompter::default()))
            .with_lock_provider(Box::new(MemoryLockProvider::new()))
    }

    #[test]
    fn test_lazy_commands_are_built_once_on_first_use() {
        GREETERS.with(|count| count.set(0));
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        assert_eq!(GREETERS.with(Cell::get), 0);
        assert!(app.has("example:greet"));

        let mut output = BufferedOutput::new();
        app.call("example:greet", Input::new(), &mut output).unwrap();
        app.call("example:greet", Input::new(), &mut output).unwrap();
        assert_eq!(GREETERS.with(Cell::get), 1);
        assert_eq!(output.lines(), &["[INFO] Hello world", "[INFO] Hello world"]);
    }

    #[test]
    fn test_summary_namespaces() {
        let summary = |name: &str| CommandSummary {
            name: name.to_string(),
            description: String::new(),
            hidden: false,
        };

        let nested = summary("example:money:come");
        assert_eq!(nested.namespace(), Some("example"));
        assert_eq!(nested.namespace_at(2), Some("example:money"));
        assert!(nested.in_namespace("example"));
        assert!(nested.in_namespace("example:money"));
        assert!(!nested.in_namespace("example:mon"));
        assert!(!nested.in_namespace("example:money:come"));

        assert_eq!(summary("list").namespace(), None);
        assert!(!summary("list").in_namespace("list"));
    }

    #[test]
    fn test_list_namespace_includes_nested_commands() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        app.command("example:money:come", |_cx| Ok(())).purpose("Count money");
        app.command("other:thing", |_cx| Ok(())).purpose("Something else");

        let mut output = BufferedOutput::new();
        assert_eq!(app.run(["clerk", "list", "example"], &mut output), ExitStatus::Success);
        let contents = output.contents();
        assert!(contents.contains("Available commands for the \"example\" namespace:"));
        assert!(contents.contains("example:greet"));
        assert!(contents.contains("example:money:come"));
        assert!(!contents.contains("other:thing"));

        let mut output = BufferedOutput::new();
        app.run(["clerk", "list"], &mut output);
        let sections: Vec<&String> = output.lines().iter().filter(|line| line.starts_with(" e")).collect();
        assert_eq!(sections, [" example"]);
    }

    #[test]
    fn test_eager_commands_are_built_at_registration() {
        GREETERS.with(|count| count.set(0));
        let _app = test_app().with_commands(&[CommandType::of::<Greeter>()], false);
        assert_eq!(GREETERS.with(Cell::get), 1);
    }

    #[test]
    fn test_listing_keeps_lazy_commands_unbuilt() {
        GREETERS.with(|count| count.set(0));
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let summaries = app.all().unwrap();
        assert_eq!(GREETERS.with(Cell::get), 0);

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["example:greet", "list"]);
        assert_eq!(summaries[0].namespace(), Some("example"));
    }

    #[test]
    fn test_run_parses_arguments_and_flags() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let mut output = BufferedOutput::new();

        let status = app.run(["clerk", "example:greet", "Jane", "-y"], &mut output);
        assert_eq!(status, ExitStatus::Success);
        assert_eq!(output.lines(), &["[INFO] HELLO JANE"]);
    }

    #[test]
    fn test_run_quiet_flag() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let mut output = BufferedOutput::new();

        let status = app.run(["clerk", "-q", "example:greet"], &mut output);
        assert_eq!(status, ExitStatus::Success);
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_run_unknown_command_fails() {
        let mut app = test_app();
        let mut output = BufferedOutput::new();

        let status = app.run(["clerk", "nope"], &mut output);
        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(output.error_lines(), &["Command \"nope\" is not defined."]);
    }

    #[test]
    fn test_run_rejects_unknown_option() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let mut output = BufferedOutput::new();

        let status = app.run(["clerk", "example:greet", "--colour"], &mut output);
        assert_eq!(status, ExitStatus::Failure);
        assert!(output.error_lines()[0].starts_with("Invalid input:"));
    }

    #[test]
    fn test_version_and_list() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);

        let mut output = BufferedOutput::new();
        assert_eq!(app.run(["clerk", "--version"], &mut output), ExitStatus::Success);
        assert_eq!(output.lines(), &["Test App 2.0"]);

        let mut output = BufferedOutput::new();
        assert_eq!(app.run(["clerk"], &mut output), ExitStatus::Success);
        let contents = output.contents();
        assert!(contents.contains("Available commands:"));
        assert!(contents.contains("  example:greet         Greets someone"));
        assert!(contents.contains("  list                  List commands"));
    }

    #[test]
    fn test_help_is_rendered_by_clap() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let mut output = BufferedOutput::new();

        let status = app.run(["clerk", "example:greet", "--help"], &mut output);
        assert_eq!(status, ExitStatus::Success);
        let contents = output.contents();
        assert!(contents.contains("Greets someone"));
        assert!(contents.contains("--yell"));
    }

    #[test]
    fn test_default_command_runs_without_a_name() {
        let mut app = test_app().with_default_command::<Greeter>();
        let mut output = BufferedOutput::new();

        assert_eq!(app.run(["clerk", "Jane"], &mut output), ExitStatus::Success);
        assert_eq!(output.lines(), &["[INFO] Hello Jane"]);
        assert_eq!(app.default_command(), Some("example:greet"));
    }

    #[test]
    fn test_closure_loader_is_compiled_once() {
        let inits = Rc::new(Cell::new(0));
        let counter = inits.clone();
        let mut app = test_app();
        app.command("hello", |cx| {
            cx.output().writeln("hi");
            Ok(())
        })
        .purpose("Say hi")
        .input(move |_definition| counter.set(counter.get() + 1));

        let mut output = BufferedOutput::new();
        assert_eq!(app.run(["clerk", "hello"], &mut output), ExitStatus::Success);
        assert_eq!(app.run(["clerk", "hello"], &mut output), ExitStatus::Success);
        assert_eq!(inits.get(), 1);
        assert_eq!(output.lines(), &["hi", "hi"]);
        assert_eq!(app.state(), AppState::Ready);
    }

    #[test]
    fn test_last_closure_registration_wins() {
        let mut app = test_app();
        app.command("hello", |cx| {
            cx.output().writeln("first");
            Ok(())
        });
        app.command("hello", |cx| {
            cx.output().writeln("second");
            Ok(())
        });

        let mut output = BufferedOutput::new();
        app.call("hello", Input::new(), &mut output).unwrap();
        assert_eq!(output.lines(), &["second"]);
    }

    #[test]
    fn test_registration_replaces_built_closure() {
        let mut app = test_app();
        app.command("hello", |cx| {
            cx.output().writeln("first");
            Ok(())
        });

        let mut output = BufferedOutput::new();
        app.call("hello", Input::new(), &mut output).unwrap();
        app.command("hello", |cx| {
            cx.output().writeln("second");
            Ok(())
        });
        app.call("hello", Input::new(), &mut output).unwrap();
        assert_eq!(output.lines(), &["first", "second"]);
    }

    #[test]
    fn test_registration_while_running_applies_afterwards() {
        let mut app = test_app();
        app.command("hello", |cx| {
            cx.output().writeln("first");
            cx.application().command("hello", |cx| {
                cx.output().writeln("second");
                Ok(())
            });
            Ok(())
        });

        let mut output = BufferedOutput::new();
        app.call("hello", Input::new(), &mut output).unwrap();
        app.call("hello", Input::new(), &mut output).unwrap();
        assert_eq!(output.lines(), &["first", "second"]);
    }

    #[test]
    fn test_run_with_argument_named_like_an_option() {
        let mut app = test_app();
        app.command("dup", |cx| {
            let line = format!(
                "{} {} {}",
                cx.argument("name", ""),
                cx.argument("verbose", ""),
                cx.option("name", "")
            );
            cx.output().writeln(&line);
            Ok(())
        })
        .input(|definition| {
            definition
                .add_argument(ArgumentSpec::optional("name"))
                .add_argument(ArgumentSpec::optional("verbose"))
                .add_option(OptionSpec::value("name"));
        });

        let mut output = BufferedOutput::new();
        let status = app.run(["clerk", "dup", "x", "loud", "--name", "y"], &mut output);
        assert_eq!(status, ExitStatus::Success);
        assert_eq!(output.lines(), &["\"x\" \"loud\" \"y\""]);
    }

    #[test]
    fn test_nested_call_and_reentry() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        app.command("outer", |cx| {
            cx.call("example:greet", Input::from_pairs([("name", json!("Nested"))]))?;
            let status = cx.call_silently("example:greet", Input::new())?;
            cx.output().writeln(&format!("silent: {:?}", status));
            cx.call("outer", Input::new())?;
            Ok(())
        });

        let mut output = BufferedOutput::new();
        let status = app.call("outer", Input::new(), &mut output).unwrap();
        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(output.lines()[0], "[INFO] Hello Nested");
        assert_eq!(output.lines()[1], "silent: Success");
        assert!(output.lines()[2].contains("Command \"outer\" is already running."));
        assert_eq!(output.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_lockable_command_is_skipped_while_locked() {
        let locks = MemoryLockProvider::new();
        let mut app = test_app().with_lock_provider(Box::new(locks.clone()));
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        app.command("sync", move |_cx| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .lockable(true);

        let mut output = BufferedOutput::new();
        assert_eq!(app.call("sync", Input::new(), &mut output).unwrap(), ExitStatus::Success);
        assert_eq!(runs.get(), 1);
        assert!(!locks.is_locked("sync"));

        let mut other = locks.clone();
        let _guard = other.try_lock("sync").unwrap();
        assert_eq!(app.call("sync", Input::new(), &mut output).unwrap(), ExitStatus::Success);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_lock_is_released_after_failure() {
        let locks = MemoryLockProvider::new();
        let mut app = test_app().with_lock_provider(Box::new(locks.clone()));
        app.command("sync", |_cx| anyhow::bail!("disk full")).lockable(true);

        let mut output = BufferedOutput::new();
        let status = app.call("sync", Input::new(), &mut output).unwrap();
        assert_eq!(status, ExitStatus::Failure);
        assert!(output.contents().contains("disk full"));
        assert!(!locks.is_locked("sync"));
    }

    #[test]
    fn test_invalid_input_is_a_dispatch_error() {
        let mut app = test_app().with_commands(&[CommandType::of::<Greeter>()], true);
        let mut output = BufferedOutput::new();
        let err = app
            .call("example:greet", Input::from_pairs([("--colour", json!("red"))]), &mut output)
            .unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidInput(_)));
    }
}
