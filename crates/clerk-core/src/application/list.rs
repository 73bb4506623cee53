use crate::command::CommandClass;
use crate::context::Context;
use crate::input::{ArgumentSpec, InputDefinition};
use crate::output::{MessageKind, Output};

use super::CommandSummary;

pub const LIST_COMMAND: &str = "list";

const GLOBAL_OPTIONS: [(&str, &str); 5] = [
    ("-h, --help", "Display help for the given command"),
    ("-q, --quiet", "Do not output any message"),
    ("-V, --version", "Display this application version"),
    ("-n, --no-interaction", "Do not ask any interactive question"),
    ("-v|vv|vvv, --verbose", "Increase the verbosity of messages"),
];

/// Prints the application's version, global options and visible commands.
pub struct ListCommand;

impl CommandClass for ListCommand {
    const NAME: &'static str = LIST_COMMAND;
    const DESCRIPTION: &'static str = "List commands";
    const MESSAGE_TIMESTAMP: bool = false;

    fn create() -> Self {
        ListCommand
    }

    fn init(&self, definition: &mut InputDefinition) {
        definition.add_argument(
            ArgumentSpec::optional("namespace").describe("Only list commands of this namespace"),
        );
    }

    fn handle(&mut self, cx: &mut Context<'_>) -> anyhow::Result<()> {
        let namespace = cx.argument_str("namespace").map(str::to_string);
        let version = cx.application().long_version();
        let mut commands: Vec<CommandSummary> = cx
            .application()
            .all()?
            .into_iter()
            .filter(|summary| !summary.hidden)
            .filter(|summary| match &namespace {
                Some(namespace) => summary.in_namespace(namespace),
                None => true,
            })
            .collect();
        commands.sort_by(|a, b| {
            (a.namespace().is_some(), &a.name).cmp(&(b.namespace().is_some(), &b.name))
        });

        let width = commands
            .iter()
            .map(|summary| summary.name.len())
            .chain(GLOBAL_OPTIONS.iter().map(|(flags, _)| flags.len()))
            .max()
            .unwrap_or(0)
            + 2;

        let output = cx.output();
        output.writeln(&version);
        output.writeln("");
        output.writeln(&MessageKind::Comment.wrap("Usage:"));
        output.writeln("  command [options] [arguments]");
        output.writeln("");
        output.writeln(&MessageKind::Comment.wrap("Options:"));
        for (flags, description) in GLOBAL_OPTIONS {
            output.writeln(&format!(
                "  {}{}{}",
                MessageKind::Info.wrap(flags),
                " ".repeat(width - flags.len()),
                description
            ));
        }
        output.writeln("");

        match &namespace {
            Some(namespace) => output.writeln(&MessageKind::Comment.wrap(&format!(
                "Available commands for the \"{}\" namespace:",
                namespace
            ))),
            None => output.writeln(&MessageKind::Comment.wrap("Available commands:")),
        }

        let mut current_namespace: Option<&str> = None;
        for summary in &commands {
            let summary_namespace = summary.namespace();
            if namespace.is_none() && summary_namespace.is_some() && summary_namespace != current_namespace {
                output.writeln(&format!(" {}", MessageKind::Comment.wrap(summary_namespace.unwrap_or_default())));
            }
            current_namespace = summary_namespace;
            output.writeln(&format!(
                "  {}{}{}",
                MessageKind::Info.wrap(&summary.name),
                " ".repeat(width - summary.name.len()),
                summary.description
            ));
        }
        Ok(())
    }
}
