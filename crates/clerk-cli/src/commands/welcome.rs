use clerk_core::{CommandClass, Context, Input};
use serde_json::json;

/// Shows every message style, then calls `example:friendly` twice.
pub struct WelcomeCommand;

impl CommandClass for WelcomeCommand {
    const NAME: &'static str = "example:welcome";
    const DESCRIPTION: &'static str = "Hello World";

    fn create() -> Self {
        WelcomeCommand
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        cx.info("Hello World");
        cx.comment("Comment text");
        cx.question("My Question?");
        cx.error("Warning");
        cx.line("Simple line");
        cx.error_block("Block Header", "Block message", false);
        cx.new_line(3);

        cx.call(
            "example:friendly",
            Input::from_pairs([("name", json!("Jane")), ("--age", json!(18))]),
        )?;

        // Runs, but prints nothing.
        cx.call_silently(
            "example:friendly",
            Input::from_pairs([("name", json!("John")), ("--age", json!(28))]),
        )?;
        Ok(())
    }
}
