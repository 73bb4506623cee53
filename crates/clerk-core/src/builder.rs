use std::rc::Rc;

use crate::closure::{ClosureCommand, CommandCallback, InputCallback};
use crate::context::Context;
use crate::input::InputDefinition;

/// Collects the parts of a closure command.
///
/// `build` can be called any number of times; every call returns an
/// independent command sharing this builder's callbacks.
#[derive(Clone)]
pub struct CommandBuilder {
    name: String,
    description: String,
    lockable: bool,
    message_timestamp: bool,
    hidden: bool,
    callback: CommandCallback,
    input_callback: Option<InputCallback>,
}

impl CommandBuilder {
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            lockable: false,
            message_timestamp: true,
            hidden: false,
            callback: Rc::new(callback),
            input_callback: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets the description shown in command listings.
    pub fn purpose(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Sets the callback that declares arguments and options.
    pub fn input<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut InputDefinition) + 'static,
    {
        self.input_callback = Some(Rc::new(callback));
        self
    }

    pub fn lockable(&mut self, lockable: bool) -> &mut Self {
        self.lockable = lockable;
        self
    }

    pub fn without_timestamp(&mut self) -> &mut Self {
        self.message_timestamp = false;
        self
    }

    pub fn hidden(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn build(&self) -> ClosureCommand {
        ClosureCommand {
            name: self.name.clone(),
            description: self.description.clone(),
            lockable: self.lockable,
            message_timestamp: self.message_timestamp,
            hidden: self.hidden,
            input_callback: self.input_callback.clone(),
            callback: Some(self.callback.clone()),
        }
    }
}
