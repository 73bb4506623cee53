use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use super::{Prompter, Question};
use crate::errors::ConsoleResult;

/// Prompts on the controlling terminal.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&mut self, question: &Question) -> ConsoleResult<Option<String>> {
        let answer = if question.hidden {
            Password::with_theme(&self.theme)
                .with_prompt(question.text.as_str())
                .allow_empty_password(true)
                .interact()?
        } else {
            let mut input = Input::<String>::with_theme(&self.theme)
                .with_prompt(question.text.as_str())
                .allow_empty(true);
            if let Some(default) = &question.default {
                input = input.default(default.clone()).show_default(true);
            }
            input.interact_text()?
        };

        if answer.is_empty() {
            Ok(question.default.clone())
        } else {
            Ok(Some(answer))
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> ConsoleResult<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
