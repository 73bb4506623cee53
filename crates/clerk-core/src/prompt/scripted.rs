use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{Prompter, Question};
use crate::errors::{ConsoleError, ConsoleResult};

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

/// Answers questions from a fixed queue and records what was asked.
///
/// Clones share the same script, so a test can keep a handle after giving
/// the prompter to an application. An exhausted queue answers with the
/// question's default.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    script: Rc<RefCell<Script>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        };
        Self {
            script: Rc::new(RefCell::new(script)),
        }
    }

    pub fn push_answer(&self, answer: impl Into<String>) {
        self.script.borrow_mut().answers.push_back(answer.into());
    }

    /// Prompts seen so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.script.borrow().asked.clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &Question) -> ConsoleResult<Option<String>> {
        let mut script = self.script.borrow_mut();
        script.asked.push(question.text.clone());
        match script.answers.pop_front() {
            Some(answer) if answer.is_empty() => Ok(question.default.clone()),
            Some(answer) => Ok(Some(answer)),
            None => Ok(question.default.clone()),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> ConsoleResult<bool> {
        let mut script = self.script.borrow_mut();
        script.asked.push(prompt.to_string());
        match script.answers.pop_front() {
            None => Ok(default),
            Some(answer) => match answer.trim().to_ascii_lowercase().as_str() {
                "" => Ok(default),
                "y" | "yes" | "true" => Ok(true),
                "n" | "no" | "false" => Ok(false),
                other => Err(ConsoleError::Prompt(format!(
                    "\"{}\" is not a yes/no answer",
                    other
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_in_order_then_defaults() {
        let mut prompter = ScriptedPrompter::new(["Jane"]);
        let handle = prompter.clone();

        let question = Question::new("Name?").with_default("Anonymous");
        assert_eq!(prompter.ask(&question).unwrap(), Some("Jane".to_string()));
        assert_eq!(prompter.ask(&question).unwrap(), Some("Anonymous".to_string()));
        assert_eq!(handle.asked(), vec!["Name?".to_string(), "Name?".to_string()]);
    }

    #[test]
    fn test_confirm_parses_answers() {
        let mut prompter = ScriptedPrompter::new(["yes", "n", "maybe"]);
        assert!(prompter.confirm("Continue?", false).unwrap());
        assert!(!prompter.confirm("Continue?", true).unwrap());
        assert!(prompter.confirm("Continue?", true).is_err());
        assert!(prompter.confirm("Continue?", true).unwrap());
    }
}
