use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clerk_core::{ConsoleConfig, ConsoleOutput, Registry};
use log::LevelFilter;

mod commands;

#[derive(Parser)]
#[clap(
    name = "clerk",
    about = "Demo console application",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Log level for diagnostics on stderr
    #[clap(long, default_value = "warn")]
    log_level: String,

    /// YAML file with application settings
    #[clap(long)]
    config: Option<PathBuf>,

    /// Command name followed by its arguments and options
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .parse_default_env()
        .init();

    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::new("Clerk", env!("CARGO_PKG_VERSION")),
    };
    config.apply_env()?;
    config.validate()?;
    log::debug!("Starting {} {}", config.name, config.version);

    let mut registry = Registry::with_config(config);
    commands::register(&mut registry);

    let mut output = ConsoleOutput::new();
    let args = std::iter::once("clerk".to_string()).chain(cli.args);
    let status = registry.run(args, &mut output);
    std::process::exit(status.code());
}
