use anyhow::{Context, Result};
use cardmirror::cli::{Cli, Commands, TreeArgs};
use cardmirror::config::{self, Config, Overrides, validator::ConfigValidator};
use cardmirror::convert::CommandConverter;
use cardmirror::output::{Reporter, Verbosity};
use cardmirror::{MirrorContext, commands};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let reporter = Reporter::new(Verbosity::from_flags(cli.quiet, cli.verbose));

    match cli.command {
        Commands::Build {
            tree,
            overwrite,
            dry_run,
            converter,
        } => {
            let overrides = tree_overrides(&tree, converter, overwrite);
            let config = load_config(cli.config.as_deref(), &overrides, &reporter)?;
            let converter = CommandConverter::from_template(&config.converter.command)?;
            let ctx = MirrorContext::new(&tree.source, &tree.dest, config)?;
            commands::build::execute(&ctx, &converter, &reporter, dry_run)?;
        }
        Commands::Status { tree } => {
            let overrides = tree_overrides(&tree, None, false);
            let config = load_config(cli.config.as_deref(), &overrides, &reporter)?;
            let ctx = MirrorContext::new(&tree.source, &tree.dest, config)?;
            commands::status::execute(&ctx, &reporter)?;
        }
        Commands::InitConfig { force } => {
            let path = config_path(cli.config.as_deref())
                .context("Could not determine the config directory; pass --config")?;
            commands::init_config::execute(&path, force, &reporter)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

/// Structured diagnostics on stderr, filtered by `CARDMIRROR_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(cardmirror::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn tree_overrides(tree: &TreeArgs, converter: Option<String>, overwrite: bool) -> Overrides {
    Overrides {
        source_suffix: tree.source_suffix.clone(),
        output_suffix: tree.output_suffix.clone(),
        converter,
        overwrite,
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(config::default_config_path)
}

/// Loads the config file (explicit path, then the platform default) and
/// applies the command-line overrides. A missing file means defaults.
fn load_config(
    explicit: Option<&Path>,
    overrides: &Overrides,
    reporter: &Reporter,
) -> Result<Config> {
    let mut config = match config_path(explicit) {
        Some(path) => {
            let config = Config::load(&path)?;
            for field in ConfigValidator::new().unknown_fields(&path)? {
                reporter.warning(&format!("Unknown configuration field: {field}"));
            }
            config
        }
        None => Config::default(),
    };

    config.apply(overrides)?;
    Ok(config)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
