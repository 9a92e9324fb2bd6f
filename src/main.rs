use std::{fs::File, panic, process::ExitCode, sync::Mutex};

use anyhow::{Context, Error};
use clap::Parser;
use log::{error, info};

use anchor::{
    cli::{Cli, Commands},
    Anchor, BackgroundLog, MultiLogger, ANCHOR_VERSION,
};
use anchor_api::{
    config::{Configuration, InstallPolicy},
    error::{AnchorError, AnchorResultExt, InternalError},
};
use osutils::{exe::HostRunner, files};

fn run_anchor(args: &Cli) -> Result<(), AnchorError> {
    // Log version ASAP
    info!("Anchor version: {}", ANCHOR_VERSION);

    match &args.command {
        Commands::Validate { config, policy } => {
            Anchor::new(config, InstallPolicy::from(*policy))?;
            info!("Configuration '{}' is valid", config.display());
            Ok(())
        }

        Commands::CheckDependencies { config } => {
            let config = Configuration::load(config).message("Failed to load configuration")?;
            anchor::report_dependencies(&config)
        }

        Commands::Install {
            config,
            target_root,
            policy,
            skip_preflight,
            error,
        } => {
            let res = panic::catch_unwind(|| {
                tracing::info!(metric_name = "anchor_start");
                Anchor::new(config, InstallPolicy::from(*policy))?.install(
                    target_root,
                    &HostRunner,
                    *skip_preflight,
                )
            })
            .unwrap_or_else(|e| Err(AnchorError::new(InternalError::Panic(format!("{e:?}")))));

            // return error if requested
            if let Some(error_path) = error.as_ref() {
                if let Err(e) = &res {
                    if let Err(e2) = serde_yaml::to_string(e)
                        .context("Failed to serialize error")
                        .and_then(|report| {
                            files::create_dirs(error_path.parent().unwrap_or(error_path))?;
                            Ok(std::fs::write(error_path, report)?)
                        })
                    {
                        error!("Failed to write error to file: {e2:?}");
                    }
                }
            }

            res.message(format!("Failed to execute '{}' command", args.command))
        }
    }
}

fn setup_logging(args: &Cli) -> Result<(), Error> {
    // Set up the multilogger
    let mut multilogger = MultiLogger::new()
        // Add regular env_logger to output to stderr
        .with_logger(Box::new(
            env_logger::builder()
                .format_timestamp(None)
                .filter_level(args.verbosity)
                .build(),
        ));

    // Add the background log if requested
    if let Some(path) = &args.log_file {
        multilogger.add_logger(BackgroundLog::new(path).into_logger());
    }

    multilogger.init().context("Logger already registered")
}

fn setup_tracing(args: &Cli) -> Result<(), Error> {
    use tracing_subscriber::{filter, fmt, layer::SubscriberExt, Layer};

    let Some(path) = &args.metrics_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create metrics file '{}'", path.display()))?;
    let metrics = fmt::layer()
        .json()
        .with_writer(Mutex::new(file))
        .with_filter(filter::LevelFilter::INFO);

    tracing::subscriber::set_global_default(tracing_subscriber::Registry::default().with(metrics))
        .context("Failed to set global default subscriber")
}

fn main() -> ExitCode {
    // Parse args
    let args = Cli::parse();

    // Initialize the loggers
    if let Err(e) = setup_logging(&args) {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::from(1);
    }

    // Initialize the metrics flow
    if let Err(e) = setup_tracing(&args) {
        error!("Failed to initialize tracing: {e:?}");
        return ExitCode::from(1);
    }

    // Invoke Anchor
    if let Err(e) = run_anchor(&args) {
        error!("Anchor failed: {e:?}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
