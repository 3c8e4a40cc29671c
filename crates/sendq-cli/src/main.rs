//! sendq - sequential resumable uploader
//!
//! Pushes local files and directories to a remote server one item at a time,
//! resuming partial uploads and reporting live progress.

mod display;
mod json_output;
mod progress;
mod sources;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use sendq_client::LocalFsClient;
use sendq_config::{Config, ConfigBuilder, ConfigLoader, LoggingConfig};
use sendq_engine::{Uploader, UploaderConfig};
use sendq_types::Behavior;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::json_output::PushResultJson;
use crate::progress::ProgressHooks;

/// sendq - sequential resumable uploader
#[derive(Parser)]
#[command(
    name = "sendq",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sequential resumable uploader",
    long_about = "sendq uploads files and directories one item at a time.\n\
                  Existing remote files can be overwritten, skipped, or verified by size\n\
                  and resumed from where a previous upload stopped."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files and directories
    Push {
        /// Local files or directories
        #[arg(required = true)]
        sources: Vec<PathBuf>,
        /// Remote directory receiving the sources
        #[arg(short, long = "to", value_name = "REMOTE_DIR", default_value = "/")]
        to: String,
        /// Policy for files already present on the server
        #[arg(short, long, value_enum)]
        behavior: Option<BehaviorArg>,
        /// Local directory served as the remote file system
        #[arg(long)]
        root: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
        /// Write a default configuration file
        #[arg(long, value_name = "PATH")]
        generate: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum BehaviorArg {
    /// Always upload the whole file
    Cover,
    /// Never upload files
    Skip,
    /// Compare sizes and resume partial uploads
    Verify,
}

impl From<BehaviorArg> for Behavior {
    fn from(behavior: BehaviorArg) -> Self {
        match behavior {
            BehaviorArg::Cover => Behavior::Cover,
            BehaviorArg::Skip => Behavior::Skip,
            BehaviorArg::Verify => Behavior::Verify,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_logging(&config.logging, cli.debug, cli.quiet, cli.verbose)?;

    info!("sendq v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Push {
            sources,
            to,
            behavior,
            root,
            json,
        } => {
            push_command(config, sources, to, behavior, root, cli.quiet, json).await?;
        }
        Commands::Config { default, generate } => {
            config_command(&config, default, generate)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => ConfigLoader::load_default().context("Failed to load configuration"),
    }
}

fn init_logging(
    logging: &LoggingConfig,
    debug: bool,
    quiet: bool,
    verbose: bool,
) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let console = if logging.json_format {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };

    let (file, guard) = match &logging.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {}", path.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::try_new(&logging.level)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();

    Ok(guard)
}

async fn push_command(
    mut config: Config,
    sources: Vec<PathBuf>,
    remote_dir: String,
    behavior: Option<BehaviorArg>,
    root: Option<PathBuf>,
    quiet: bool,
    json: bool,
) -> Result<()> {
    if let Some(behavior) = behavior {
        config.transfer.behavior = behavior.into();
    }
    if let Some(root) = root {
        config.server.root = root;
    }
    ConfigBuilder::validate(&config)?;

    let descriptors = sources::collect(&sources, &remote_dir)?;
    if descriptors.is_empty() {
        display::display_warning("Nothing to upload");
        return Ok(());
    }

    let total_bytes: u64 = descriptors.iter().map(|descriptor| descriptor.size).sum();
    info!(
        "Pushing {} items ({} bytes) to {} as {}",
        descriptors.len(),
        total_bytes,
        remote_dir,
        config.credentials().endpoint()
    );
    debug!("Serving remote file system from {}", config.server.root.display());

    let interactive = !quiet && !json;
    if interactive {
        println!(
            "{} Uploading {} items ({}) to {} [{}]",
            style("→").green().bold(),
            style(descriptors.len()).cyan(),
            style(display::format_bytes(total_bytes)).cyan(),
            style(&remote_dir).cyan(),
            style(config.transfer.behavior).yellow()
        );
    }

    let hooks = ProgressHooks::new(!interactive, total_bytes);
    let client = LocalFsClient::new(&config.server.root);
    let mut uploader = Uploader::new(UploaderConfig::from_config(&config), client, hooks);

    let started = Instant::now();
    uploader.submit(descriptors).await;
    let elapsed = started.elapsed();

    let status = uploader.transfer_status();
    let items = uploader.items();

    if json {
        let output = PushResultJson::new(&remote_dir, config.transfer.behavior, &status, &items, elapsed);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !quiet {
        display::print_summary(&status, &items, elapsed, uploader.last_connection_error());
    }

    if status.error_count > 0 {
        anyhow::bail!("{} of {} items failed", status.error_count, status.total);
    }

    info!("Push completed successfully");
    Ok(())
}

fn config_command(config: &Config, default: bool, generate: Option<PathBuf>) -> Result<()> {
    if let Some(path) = generate {
        ConfigLoader::generate_default_config(&path)?;
        display::display_success(&format!(
            "Default configuration written to {}",
            path.display()
        ));
        return Ok(());
    }

    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        print!("{}", serde_yaml::to_string(&Config::default())?);
        return Ok(());
    }

    println!("{} Current configuration:", style("⚙").blue().bold());
    match ConfigLoader::config_exists() {
        Some(path) => println!("Loaded from {}", style(path.display()).cyan()),
        None => println!("No configuration file found, using defaults"),
    }

    let mut shown = config.clone();
    if !shown.server.password.is_empty() {
        shown.server.password = "***".to_string();
    }
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}
