use std::thread;
use std::time::Duration;

use clerk_core::{CommandClass, Context, InputDefinition, OptionSpec};
use serde_json::Value;

pub struct MoneyComeCommand;

struct Candidate {
    position: u32,
    name: String,
}

fn candidates(max: u32) -> impl Iterator<Item = Candidate> {
    (1..=max).map(|position| Candidate {
        position,
        name: format!("Candidate-{}", position),
    })
}

impl CommandClass for MoneyComeCommand {
    const NAME: &'static str = "example:money:come";
    const DESCRIPTION: &'static str = "How much money do you have?";
    const LOCKABLE: bool = true;

    fn create() -> Self {
        MoneyComeCommand
    }

    fn init(&self, definition: &mut InputDefinition) {
        definition.add_option(
            OptionSpec::value("delay")
                .describe("Milliseconds to wait per step")
                .default_value("200"),
        );
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let delay = match cx.option("delay", "200") {
            Value::String(text) => text.parse::<u64>()?,
            Value::Number(number) => number.as_u64().unwrap_or(0),
            other => anyhow::bail!("Invalid delay: {}", other),
        };
        let pause = || thread::sleep(Duration::from_millis(delay));

        let max = 5;
        let mut bar = cx.create_progress_bar(max);
        bar.set_message("Counting money");
        bar.start();
        for _ in 0..max {
            pause();
            bar.advance(1);
        }
        bar.finish();
        cx.new_line(1);

        cx.with_progress_bar(
            candidates(5),
            |_cx, candidate, _index| {
                log::debug!("Visiting {} at {}", candidate.name, candidate.position);
                pause();
                Ok(())
            },
            0,
        )?;
        cx.new_line(1);

        cx.with_progress_bar(
            1..=10,
            |_cx, _item, _index| {
                pause();
                Ok(())
            },
            0,
        )?;
        cx.new_line(1);
        Ok(())
    }
}
