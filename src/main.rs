use clap::Parser;
use cody_sync::cli::commands;
use cody_sync::cli::{Cli, Commands};
use cody_sync::config;
use cody_sync::logging::init_logging;
use cody_sync::{StructuredError, SyncError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);

    let result = match &cli.command {
        Commands::Sync(args) => commands::sync::execute(args, cli.json, cli.quiet, &overrides),
        Commands::Backlog(args) => commands::backlog::execute(args, cli.json, &overrides),
        Commands::Tasklist(args) => commands::tasklist::execute(args, cli.json, &overrides),
        Commands::List(args) => commands::list::execute(args, cli.json, &overrides),
        Commands::Classify(args) => commands::classify::execute(args, cli.json, &overrides),
        Commands::Deps(args) => commands::deps::execute(args, cli.json, &overrides),
        Commands::Check(args) => commands::check::execute(args, cli.json, &overrides),
        Commands::Config => commands::config::execute(cli.json, &overrides),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs human-readable error with optional color.
fn handle_error(err: &SyncError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        root: cli.root.clone(),
        issues: cli.issues.clone(),
        build_root: cli.build_root.clone(),
        include_closed: match &cli.command {
            Commands::Sync(args) if args.include_closed => Some(true),
            Commands::Tasklist(args) if args.include_closed => Some(true),
            _ => None,
        },
        version_order: cli.version_order.clone(),
    }
}
