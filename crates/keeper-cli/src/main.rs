//! search-keeper CLI
//!
//! Keeps OpenSearch index templates and ISM policies in version-controllable
//! YAML files, per environment.

mod cli;
mod commands;
mod context;
mod error;
mod output;

use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use keeper_core::Interrupt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `-v` forces DEBUG, otherwise `RUST_LOG` or warnings only.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: cannot install logger: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

/// Exit status after a second Ctrl-C (128 + SIGINT)
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Interrupt fired by Ctrl-C or, if given, after `timeout` seconds.
fn interrupt(timeout: Option<u64>) -> Interrupt {
    let interrupt = match timeout {
        Some(secs) => Interrupt::new().with_timeout(Duration::from_secs(secs)),
        None => Interrupt::new(),
    };
    let handle = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handle.trigger() {
            eprintln!("{} aborting", "interrupted again:".red().bold());
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        eprintln!(
            "{} finishing items in progress (press Ctrl-C again to abort)",
            "interrupted:".yellow().bold()
        );
    }) {
        tracing::warn!(error = %e, "cannot install Ctrl-C handler");
    }
    interrupt
}

fn run(cli: Cli) -> Result<bool> {
    let Some(command) = cli.command else {
        println!("{} OpenSearch template keeper", "search-keeper".green().bold());
        println!();
        println!("Run {} for available commands.", "search-keeper --help".cyan());
        return Ok(true);
    };

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "search-keeper", &mut std::io::stdout());
        return Ok(true);
    }

    let ctx = Context::load(cli.config.as_deref())?
        .with_workers(cli.workers.map(usize::from))
        .with_interrupt(interrupt(cli.timeout));

    execute_command(&ctx, command)
}

fn execute_command(ctx: &Context, command: Commands) -> Result<bool> {
    match command {
        Commands::Environments { format } => commands::run_environments(ctx, format),
        Commands::List { selection, format } => commands::run_list(ctx, &selection, format),
        Commands::Save {
            selection,
            dry_run,
            format,
        } => commands::run_save(ctx, &selection, dry_run, format),
        Commands::Publish {
            selection,
            dry_run,
            format,
        } => commands::run_publish(ctx, &selection, dry_run, format),
        Commands::Delete {
            environment,
            kind,
            name,
            purge_local,
        } => commands::run_delete(ctx, &environment, kind.into(), &name, purge_local),
        Commands::Completions { .. } => Ok(true),
    }
}
