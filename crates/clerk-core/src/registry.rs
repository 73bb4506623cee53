//! Process-level command registry
//!
//! A [`Registry`] collects closure commands and command types before any
//! application exists, then builds applications from them. It also keeps
//! one memoized application so commands can be called by name from plain
//! code, outside of any running command.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::application::{Application, FactoryCommandLoader};
use crate::builder::CommandBuilder;
use crate::command::CommandType;
use crate::config::ConsoleConfig;
use crate::context::Context;
use crate::errors::ExitStatus;
use crate::input::Input;
use crate::output::{ConsoleOutput, Output, Verbosity};

pub struct Registry {
    config: ConsoleConfig,
    closure_commands: BTreeMap<String, CommandBuilder>,
    commands: Vec<CommandType>,
    lazy_load: bool,
    app: Option<Application>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_application(
    config: ConsoleConfig,
    closure_commands: &BTreeMap<String, CommandBuilder>,
    commands: &[CommandType],
    lazy_load: bool,
) -> Application {
    let mut app = Application::from_config(config);
    for builder in closure_commands.values() {
        app.add_builder(builder.clone());
    }
    app.register_commands(commands, lazy_load);
    app
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(ConsoleConfig::default())
    }

    pub fn with_config(config: ConsoleConfig) -> Self {
        Self {
            config,
            closure_commands: BTreeMap::new(),
            commands: Vec::new(),
            lazy_load: true,
            app: None,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Registers a closure command. A later registration under the same name
    /// replaces the earlier one.
    pub fn command<F>(&mut self, name: impl Into<String>, callback: F) -> &mut CommandBuilder
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        let builder = CommandBuilder::new(name.clone(), callback);
        match self.closure_commands.entry(name) {
            Entry::Occupied(mut entry) => {
                entry.insert(builder);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(builder),
        }
    }

    /// Sets the command types applications are built with.
    pub fn commands(&mut self, commands: &[CommandType], lazy_load: bool) -> &mut Self {
        self.commands = commands.to_vec();
        self.lazy_load = lazy_load;
        self
    }

    pub fn closure_command_loader(&self) -> FactoryCommandLoader {
        build_application(self.config.clone(), &self.closure_commands, &[], true)
            .closure_command_loader()
    }

    /// A new application carrying every registered command.
    pub fn make(&self, name: impl Into<String>, version: impl Into<String>) -> Application {
        let config = ConsoleConfig {
            name: name.into(),
            version: version.into(),
            ..self.config.clone()
        };
        build_application(config, &self.closure_commands, &self.commands, self.lazy_load)
    }

    /// The shared application, built on first access. Registrations made
    /// afterwards do not reach it.
    pub fn application(&mut self) -> &mut Application {
        self.app.get_or_insert_with(|| {
            build_application(
                self.config.clone(),
                &self.closure_commands,
                &self.commands,
                self.lazy_load,
            )
        })
    }

    pub fn set_application(&mut self, app: Application) {
        self.app = Some(app);
    }

    /// Calls `name` on the shared application with a terminal output.
    pub fn call(&mut self, name: &str, input: Input, silently: bool) -> ExitStatus {
        let mut output = ConsoleOutput::new();
        self.call_with(name, input, silently, &mut output)
    }

    /// Calls `name` on the shared application. Failures of any kind are
    /// logged and reported as [`ExitStatus::Failure`].
    pub fn call_with(
        &mut self,
        name: &str,
        input: Input,
        silently: bool,
        output: &mut dyn Output,
    ) -> ExitStatus {
        output.set_verbosity(if silently {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        });
        match self.application().call(name, input, output) {
            Ok(status) => status,
            Err(e) => {
                log::error!("{}", e);
                ExitStatus::Failure
            }
        }
    }

    pub fn run<I, T>(&mut self, args: I, output: &mut dyn Output) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.application().run(args, output)
    }
}
