//! Command abstractions
//!
//! There are two ways to define a command:
//!
//! - a type implementing [`CommandClass`], which declares its name and
//!   description as associated constants so the name is known before any
//!   instance exists (this is what makes lazy registration possible);
//! - a [`ClosureCommand`](crate::closure::ClosureCommand) built at run time
//!   from a name and a callback.
//!
//! Both are used through the object-safe [`Command`] trait. An application
//! calls [`Command::configure`] once right after construction and keeps the
//! resulting [`CommandDefinition`] next to the instance.

use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::errors::ExitStatus;
use crate::input::InputDefinition;

/// Everything the dispatcher needs to know about a command without running it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub input: InputDefinition,
    pub lockable: bool,
    pub message_timestamp: bool,
    pub hidden: bool,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input: InputDefinition::new(),
            lockable: false,
            message_timestamp: true,
            hidden: false,
        }
    }
}

/// Runtime interface of a command.
pub trait Command {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn lockable(&self) -> bool {
        false
    }

    fn message_timestamp(&self) -> bool {
        true
    }

    fn hidden(&self) -> bool {
        false
    }

    /// Declares arguments and options.
    fn init(&self, _definition: &mut InputDefinition) {}

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()>;

    fn configure(&self) -> CommandDefinition {
        let mut definition = CommandDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input: InputDefinition::new(),
            lockable: self.lockable(),
            message_timestamp: self.message_timestamp(),
            hidden: self.hidden(),
        };
        self.init(&mut definition.input);
        definition
    }
}

/// Static declaration of a command type.
///
/// ```ignore
/// struct Welcome;
///
/// impl CommandClass for Welcome {
///     const NAME: &'static str = "example:welcome";
///     const DESCRIPTION: &'static str = "Say welcome";
///
///     fn create() -> Self {
///         Welcome
///     }
///
///     fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
///         cx.info("Welcome!");
///         Ok(())
///     }
/// }
/// ```
pub trait CommandClass: Sized + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str = "";
    const LOCKABLE: bool = false;
    const MESSAGE_TIMESTAMP: bool = true;
    const HIDDEN: bool = false;

    fn create() -> Self;

    fn init(&self, _definition: &mut InputDefinition) {}

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()>;

    /// A lazy descriptor that defers `create` until the command is needed.
    fn lazy_command() -> LazyCommand {
        CommandType::of::<Self>().lazy()
    }
}

impl<T: CommandClass> Command for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn description(&self) -> &str {
        T::DESCRIPTION
    }

    fn lockable(&self) -> bool {
        T::LOCKABLE
    }

    fn message_timestamp(&self) -> bool {
        T::MESSAGE_TIMESTAMP
    }

    fn hidden(&self) -> bool {
        T::HIDDEN
    }

    fn init(&self, definition: &mut InputDefinition) {
        CommandClass::init(self, definition)
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        CommandClass::handle(self, cx)
    }
}

fn construct<T: CommandClass>() -> Box<dyn Command> {
    Box::new(T::create())
}

/// Identifies a command type: its declared name and how to build it.
#[derive(Clone, Copy)]
pub struct CommandType {
    name: &'static str,
    description: &'static str,
    hidden: bool,
    constructor: fn() -> Box<dyn Command>,
}

impl CommandType {
    pub fn of<T: CommandClass>() -> Self {
        Self {
            name: T::NAME,
            description: T::DESCRIPTION,
            hidden: T::HIDDEN,
            constructor: construct::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn create(&self) -> Box<dyn Command> {
        (self.constructor)()
    }

    pub fn lazy(&self) -> LazyCommand {
        let constructor = self.constructor;
        LazyCommand::new(self.name, self.description, Rc::new(constructor)).hidden(self.hidden)
    }
}

impl fmt::Debug for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandType")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

pub type CommandFactory = Rc<dyn Fn() -> Box<dyn Command>>;

/// A command known by name and description only, built on first use.
#[derive(Clone)]
pub struct LazyCommand {
    name: String,
    description: String,
    hidden: bool,
    factory: CommandFactory,
}

impl LazyCommand {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        factory: CommandFactory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            hidden: false,
            factory,
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn create(&self) -> Box<dyn Command> {
        (self.factory)()
    }
}

impl fmt::Debug for LazyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCommand")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("hidden", &self.hidden)
            .finish()
    }
}

/// Runs `command` with its lock and error handling.
///
/// A lockable command whose lock is held elsewhere is skipped and still
/// reports success. Errors from the command body are printed, logged and
/// turned into [`ExitStatus::Failure`].
pub fn execute(command: &mut dyn Command, cx: &mut Context<'_>) -> ExitStatus {
    let name = cx.name().to_string();

    let result = if cx.definition().lockable {
        match cx.application().lock_provider_mut().try_lock(&name) {
            Ok(Some(guard)) => {
                let result = command.handle(cx);
                drop(guard);
                result
            }
            Ok(None) => {
                log::info!("Command '{}' is already running in another process, skipping", name);
                return ExitStatus::Success;
            }
            Err(e) => Err(e.into()),
        }
    } else {
        command.handle(cx)
    };

    match result {
        Ok(()) => ExitStatus::Success,
        Err(e) => {
            cx.error(e.to_string());
            log::error!("Command '{}' failed: {:#}", name, e);
            ExitStatus::Failure
        }
    }
}
