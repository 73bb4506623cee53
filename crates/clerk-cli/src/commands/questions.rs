use clerk_core::{ChoiceQuestion, CommandClass, Context};

pub struct QuestionsCommand;

impl CommandClass for QuestionsCommand {
    const NAME: &'static str = "example:questions";
    const DESCRIPTION: &'static str = "Let me know you better.";

    fn create() -> Self {
        QuestionsCommand
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let name = cx.ask("What is your name?", Some("John"))?.unwrap_or_default();
        cx.info(format!("Your name is \"{}\"", name));

        let secret = cx.secret("Please tell me a secret?", None)?.unwrap_or_default();
        cx.info(format!("Your secret is \"{}\"", secret));

        if cx.confirm("Are you above 18yo (y/n)?", false)? {
            cx.info("You have grown up!");
        } else {
            cx.info("You are very young!");
        }

        let question = ChoiceQuestion::new("Which color do you like?", ["Yellow", "Orange", "Blue"]);
        let choice = cx.choice(&question)?;
        cx.info(format!("You have selected \"{}\"", choice.join(", ")));
        Ok(())
    }
}
