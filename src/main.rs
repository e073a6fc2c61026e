//! Synthetics CI step entrypoint.
//!
//! Resolves the run configuration from the step inputs in the process
//! environment and the project configuration file, then writes it as JSON
//! for the orchestration client to consume.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use clap::Parser;
use synthetics_step::{
    ProcessEnvironment, ResolveError, ResolvedConfig, TracingReporter, WorkspaceConfigFiles,
    resolve_config,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the step binary.
#[derive(Debug, Parser)]
#[command(name = "synthetics-step", version, about)]
struct Cli {
    /// Directory the configuration file path is resolved against.
    #[arg(long, default_value = ".")]
    working_dir: Utf8PathBuf,

    /// Writes the resolved configuration to this file instead of stdout.
    #[arg(long, short = 'o')]
    output: Option<Utf8PathBuf>,
}

#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("I/O error: {message}")]
    Io { message: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), StepError> {
    let snapshot = ProcessEnvironment::snapshot();
    let files = WorkspaceConfigFiles::new(cli.working_dir);

    let config = resolve_config(&TracingReporter, &snapshot, &files).await?;
    let rendered = render(&config)?;

    match cli.output.as_deref() {
        Some(path) => write_output_file(path, &rendered),
        None => writeln!(io::stdout().lock(), "{rendered}").map_err(|error| StepError::Io {
            message: error.to_string(),
        }),
    }
}

fn render(config: &ResolvedConfig) -> Result<String, StepError> {
    serde_json::to_string_pretty(config).map_err(|error| StepError::Io {
        message: format!("failed to serialise configuration: {error}"),
    })
}

fn write_output_file(path: &Utf8Path, rendered: &str) -> Result<(), StepError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| StepError::Io {
        message: format!("invalid output path '{path}': no file name"),
    })?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| StepError::Io {
        message: format!("failed to open output directory '{parent}': {error}"),
    })?;
    dir.write(file_name, rendered).map_err(|error| StepError::Io {
        message: format!("failed to write configuration to '{path}': {error}"),
    })?;

    tracing::info!(path = %path, "wrote resolved configuration");
    Ok(())
}
