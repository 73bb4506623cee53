//! Command registration and invocation for terminal applications.
//!
//! This crate provides the pieces needed to build a multi-command CLI out of
//! small, self-contained commands, and to let those commands call each other.
//!
//! # Architecture Overview
//!
//! - **Commands**: statically declared types ([`CommandClass`]) and closure
//!   commands ([`ClosureCommand`], [`CommandBuilder`]) behind one [`Command`] trait
//! - **Registration**: eager instances, lazy descriptors and closure loaders,
//!   each constructed at most once per [`Application`]
//! - **Invocation**: argv dispatch through clap, nested `call`/`call_silently`
//!   from a running command's [`Context`], and a [`Registry`] for calling
//!   commands from plain code
//! - **Single-instance locking**: lockable commands skip their run while another
//!   process holds the lock
//! - **Terminal capabilities**: styled messages, prompts, tables and progress
//!   bars, each behind a trait with an in-memory implementation for tests
//! - **Configuration**: YAML file and `CLERK_*` environment overrides

pub mod application;
pub mod builder;
pub mod closure;
pub mod command;
pub mod config;
pub mod context;
pub mod date_range;
pub mod errors;
pub mod input;
pub mod lock;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod registry;
pub mod table;

pub use application::{AppState, Application, CommandLoader, CommandSummary, FactoryCommandLoader};
pub use builder::CommandBuilder;
pub use closure::ClosureCommand;
pub use command::{execute, Command, CommandClass, CommandDefinition, CommandType, LazyCommand};
pub use config::ConsoleConfig;
pub use context::Context;
pub use errors::{ConsoleError, ConsoleResult, ExitStatus};
pub use input::{ArgumentSpec, Input, InputDefinition, OptionSpec};
pub use output::{BufferedOutput, ConsoleOutput, Output, Verbosity};
pub use prompt::{ChoiceQuestion, Prompter, Question};
pub use registry::Registry;
