//! Demo commands shipped with the `clerk` binary.

mod friendly;
mod money_come;
mod questions;
mod report;
mod welcome;
mod winners;

use clerk_core::{CommandType, Registry};

use friendly::FriendlyCommand;
use money_come::MoneyComeCommand;
use questions::QuestionsCommand;
use welcome::WelcomeCommand;
use winners::WinnersCommand;

/// Registers every demo command with `registry`.
pub fn register(registry: &mut Registry) {
    registry.commands(
        &[
            CommandType::of::<WelcomeCommand>(),
            CommandType::of::<FriendlyCommand>(),
            CommandType::of::<QuestionsCommand>(),
            CommandType::of::<MoneyComeCommand>(),
            CommandType::of::<WinnersCommand>(),
        ],
        true,
    );
    report::register(registry);
}
