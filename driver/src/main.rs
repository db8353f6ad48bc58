//! avlbst-driver - Run command scripts against an AVL tree
//!
//! Usage:
//!   avlbst-driver [--config <yaml>] [--format text|json] [--verify] [SCRIPT]
//!
//! Reads the script from standard input when no path is given.

mod config;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use config::{ConfigFile, OutputFormat, Overrides, Settings};
use script::Session;

#[derive(Parser, Debug)]
#[command(name = "avlbst-driver", version)]
#[command(about = "Run insert/remove/find scripts against an AVL tree")]
struct Cli {
    /// YAML config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Validate the tree after every mutating command
    #[arg(long)]
    verify: bool,

    /// Log filter directive (e.g. avlbst=trace), used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,

    /// Script file (default: standard input)
    script: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            format: self.format,
            verify: self.verify.then_some(true),
            log: self.log.clone(),
        }
    }
}

fn init_tracing(directive: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read script from stdin")?;
            Ok(source)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file = ConfigFile::load(cli.config.as_deref())?;
    let settings = Settings::resolve(cli.overrides(), |name| std::env::var(name).ok(), file)?;
    init_tracing(&settings.log);
    tracing::debug!(?settings, "resolved settings");

    let source = read_script(cli.script.as_deref())?;
    let commands = script::parse(&source)?;

    let mut session = Session::new(settings.verify);
    let mut out = io::stdout().lock();
    for (line, command) in commands {
        let reply = session
            .execute(command)
            .with_context(|| format!("line {line}"))?;
        script::write_reply(&mut out, &reply, settings.format)?;
    }
    out.flush()?;

    tracing::info!(entries = session.tree().len(), "script finished");
    Ok(())
}
