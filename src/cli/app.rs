//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{expand, inspect};
use crate::config::Config;
use crate::macros::builtin;
use crate::plugin::{serve_stdio, Framing, MessageHandler};

#[derive(Parser)]
#[command(name = "compiler-plugin")]
#[command(author, version, about = "Macro expansion plugin for the Swift compiler")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (defaults to config.toml in the user config directory)
    #[arg(long, global = true, env = "COMPILER_PLUGIN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the plugin protocol on stdin/stdout
    Serve {
        /// Message framing (overrides the config file)
        #[arg(long)]
        framing: Option<Framing>,
    },

    /// Print the capability advertised to the host
    Capability,

    /// List the macros this plugin provides
    Macros,

    /// Dispatch a single request read from a JSON file and print the reply
    Expand {
        /// Path to a host-to-plugin message
        request: PathBuf,

        /// Negotiate this host protocol version before dispatching
        #[arg(long)]
        protocol_version: Option<u32>,
    },
}

/// Runs the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_logging(&config, cli.verbose)?;

    let output = Output::new(cli.format);

    match cli.command.unwrap_or(Commands::Serve { framing: None }) {
        Commands::Serve { framing } => serve(&config, framing)?,
        Commands::Capability => inspect::capability(&config, &output),
        Commands::Macros => inspect::macros(&output)?,
        Commands::Expand {
            request,
            protocol_version,
        } => expand::run(&config, &request, protocol_version, &output)?,
    }

    Ok(())
}

/// Builds the handler for the built-in macros
pub(super) fn build_handler(config: &Config) -> Result<MessageHandler> {
    let registry = builtin::registry().context("Failed to register built-in macros")?;
    Ok(MessageHandler::new(registry, config.plugin_capability())
        .with_options(config.handler_options()))
}

fn serve(config: &Config, framing: Option<Framing>) -> Result<()> {
    let framing = framing.unwrap_or(config.transport.framing);
    let handler = build_handler(config)?;

    info!(
        ?framing,
        macros = handler.registry().len(),
        "serving plugin protocol"
    );

    serve_stdio(handler, framing, config.transport.max_frame_bytes)
        .context("Plugin session failed")?;
    Ok(())
}

/// Installs the stderr subscriber; stdout belongs to the protocol
fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        config.log.level_filter()?
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    Ok(())
}
