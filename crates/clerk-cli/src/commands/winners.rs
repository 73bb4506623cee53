use clerk_core::{CommandClass, Context};
use serde_json::json;

pub struct WinnersCommand;

struct Candidate {
    position: u32,
    name: String,
    score: u32,
}

impl CommandClass for WinnersCommand {
    const NAME: &'static str = "example:winners";
    const DESCRIPTION: &'static str = "Who is the winner?";

    fn create() -> Self {
        WinnersCommand
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        cx.table(
            ["Place", "Name", "Score"],
            &[
                json!([1, "Zang", "100"]),
                json!([2, "Jane", "98"]),
                json!([3, "Alvin", "95"]),
                json!([4, "Mary", "89"]),
                json!([5, "Alex", "88"]),
                json!([6, "Wong", "87"]),
            ],
        )?;

        let candidates = (1..=20).map(|position| Candidate {
            position,
            name: format!("Candidate-{}", position),
            score: position * 100,
        });
        cx.table_with(["Place", "Name", "Score"], candidates, |candidate| {
            vec![
                json!(candidate.position),
                json!(candidate.name),
                json!(candidate.score),
            ]
        })?;
        Ok(())
    }
}
