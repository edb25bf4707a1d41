mod annotate_cmd;
mod check_config_cmd;
mod search_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, warn};
use uuid::Uuid;

use greenlens_config::{config_dir, config_file_path, load_and_prepare, validate, GreenlensConfig};
use greenlens_core::LensError;
use greenlens_logging::{init_logger, EventLogger, PipelineEvent};

#[derive(Parser)]
#[command(name = "greenlens")]
#[command(about = "Greenlens: label objects in photos and search the product catalog")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.greenlens/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a vision model's detections onto an image
    Annotate(annotate_cmd::AnnotateArgs),
    /// Find the catalog entries closest to a query
    Search(search_cmd::SearchArgs),
    /// Load and validate the config, then print the effective values
    CheckConfig,
}

impl Commands {
    fn stage(&self) -> &'static str {
        match self {
            Commands::Annotate(_) => "annotate",
            Commands::Search(_) => "search",
            Commands::CheckConfig => "check-config",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    if let Commands::CheckConfig = cli.command {
        return match check_config_cmd::run(&path).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("{e:#}");
                ExitCode::FAILURE
            }
        };
    }

    let config = match load_and_prepare(&path).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid config {}: {e:#}", path.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let request_id = Uuid::new_v4().to_string();
    let stage = cli.command.stage();
    let outcome = match cli.command {
        Commands::Annotate(args) => {
            let annotate = config.annotate.unwrap_or_default();
            annotate_cmd::run(args, &annotate, &request_id).await
        }
        Commands::Search(args) => {
            let retrieval = config.retrieval.unwrap_or_default();
            search_cmd::run(args, &retrieval, &request_id).await
        }
        Commands::CheckConfig => Ok(()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            EventLogger::log_event(
                &request_id,
                PipelineEvent::Failed {
                    stage: stage.to_string(),
                    error_msg: format!("{e:#}"),
                },
            );
            error!(request_id = %request_id, "{e:#}");
            // Usage problems (bad input) get a distinct exit code
            match e.downcast_ref::<LensError>() {
                Some(lens) if lens.is_client_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

/// Install the subscriber, then replay config warnings that were emitted before it existed.
fn init_logging(config: &GreenlensConfig) -> Result<()> {
    let logging = config.logging.clone().unwrap_or_default();
    init_logger(
        logging.level.as_deref().unwrap_or(greenlens_config::defaults::DEFAULT_LOG_LEVEL),
        logging.dir.as_deref(),
        logging.json.unwrap_or(false),
    )?;
    for warning in validate(config).warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    Ok(())
}
