use std::fmt;
use std::rc::Rc;

use crate::command::Command;
use crate::context::Context;
use crate::input::InputDefinition;

pub type CommandCallback = Rc<dyn Fn(&mut Context<'_>) -> anyhow::Result<()>>;
pub type InputCallback = Rc<dyn Fn(&mut InputDefinition)>;

/// A command defined by callbacks instead of a type.
///
/// Every instance owns its callbacks, so any number of closure commands can
/// exist side by side.
#[derive(Clone)]
pub struct ClosureCommand {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) lockable: bool,
    pub(crate) message_timestamp: bool,
    pub(crate) hidden: bool,
    pub(crate) input_callback: Option<InputCallback>,
    pub(crate) callback: Option<CommandCallback>,
}

impl ClosureCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            lockable: false,
            message_timestamp: true,
            hidden: false,
            input_callback: None,
            callback: None,
        }
    }

    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Context<'_>) -> anyhow::Result<()> + 'static,
    {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn with_input<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut InputDefinition) + 'static,
    {
        self.input_callback = Some(Rc::new(callback));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Command for ClosureCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn lockable(&self) -> bool {
        self.lockable
    }

    fn message_timestamp(&self) -> bool {
        self.message_timestamp
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn init(&self, definition: &mut InputDefinition) {
        if let Some(callback) = &self.input_callback {
            callback(definition);
        }
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        match &self.callback {
            Some(callback) => callback(cx),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ClosureCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureCommand")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("lockable", &self.lockable)
            .field("has_input_callback", &self.input_callback.is_some())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Application;
    use crate::errors::ExitStatus;
    use crate::input::{ArgumentSpec, Input};
    use crate::output::{BufferedOutput, Output};

    #[test]
    fn test_init_runs_input_callback() {
        let command = ClosureCommand::new("hello").with_input(|definition| {
            definition.add_argument(ArgumentSpec::required("who"));
        });
        let definition = command.configure();
        assert_eq!(definition.name, "hello");
        assert!(definition.input.argument("who").is_some());
    }

    #[test]
    fn test_instances_keep_their_own_callbacks() {
        let first = ClosureCommand::new("first").with_callback(|cx| {
            cx.output().writeln("first");
            Ok(())
        });
        let second = ClosureCommand::new("second").with_callback(|cx| {
            cx.output().writeln("second");
            Ok(())
        });

        let mut app = Application::new("Test", "1.0");
        app.add(Box::new(first)).add(Box::new(second));
        let mut output = BufferedOutput::new();

        app.call("first", Input::new(), &mut output).unwrap();
        app.call("second", Input::new(), &mut output).unwrap();
        assert_eq!(output.lines(), &["first", "second"]);
    }

    #[test]
    fn test_missing_callback_is_a_no_op() {
        let mut app = Application::new("Test", "1.0");
        app.add(Box::new(ClosureCommand::new("noop")));
        let mut output = BufferedOutput::new();
        let status = app.call("noop", Input::new(), &mut output).unwrap();
        assert_eq!(status, ExitStatus::Success);
        assert!(output.lines().is_empty());
    }
}
