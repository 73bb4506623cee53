use clerk_core::{ArgumentSpec, CommandClass, Context, InputDefinition, OptionSpec};
use serde_json::Value;

pub struct FriendlyCommand;

impl CommandClass for FriendlyCommand {
    const NAME: &'static str = "example:friendly";
    const DESCRIPTION: &'static str = "Hi, I am a friendly command.";

    fn create() -> Self {
        FriendlyCommand
    }

    fn init(&self, definition: &mut InputDefinition) {
        definition
            .add_argument(ArgumentSpec::required("name").describe("Who is talking"))
            .add_option(OptionSpec::value("age").shortcut('a').describe("Age in years"));
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let name = cx.argument_str("name").unwrap_or_default().to_string();
        cx.info(format!("Hello World, I am {}", name));

        match cx.option("age", Value::Null) {
            Value::Null => {}
            Value::String(age) => cx.info(format!("I am {} years old.", age)),
            age => cx.info(format!("I am {} years old.", age)),
        }
        Ok(())
    }
}
