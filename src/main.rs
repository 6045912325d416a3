//! cpg-reducer CLI entry point

use clap::error::ErrorKind;
use clap::Parser;
use cpg_core::{CpgError, NodeGranularity, OutputFormat, PipelineConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

const USAGE: &str = "usage: cpg-reducer -n function|compartment -f d3-arc input-dot-file";

#[derive(Parser)]
#[command(name = "cpg-reducer", version)]
#[command(about = "Reduce a code property graph to its cross-file calls", long_about = None)]
struct Cli {
    /// Node granularity of the emitted diagram
    #[arg(short = 'n', value_name = "function|compartment", default_value_t = NodeGranularity::Compartment)]
    granularity: NodeGranularity,

    /// Output format
    #[arg(short = 'f', value_name = "d3-arc", default_value_t = OutputFormat::D3Arc)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// DOT file holding one or more graphs
    input: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => err.exit(),
        Err(_) => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr; stdout only carries the emitted documents.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "cpg_reducer={level},cpg_core={level},cpg_dot={level}",
            level = log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("cpg-reducer v{}", env!("CARGO_PKG_VERSION"));

    let config = PipelineConfig {
        granularity: cli.granularity,
        format: cli.format,
    };
    let stdout = std::io::stdout();
    match commands::run(config, &cli.input, stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err
                .downcast_ref::<CpgError>()
                .is_some_and(CpgError::is_precondition_violation)
            {
                tracing::error!("malformed input graph: {:#}", err);
                std::process::abort();
            }
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
