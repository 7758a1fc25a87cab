use anyhow::Result;
use clap::Parser;
use pagestat::config::Config;
use pagestat::pipeline::Pipeline;
use pagestat::substrate::{local, JobRequest};
use pagestat::supervisor::ticker::IntervalTicker;
use pagestat::supervisor::{JobSupervisor, SupervisionOutcome};
use std::path::PathBuf;
use tracing::{debug, info};

/// Aggregate page view records: total time spent and average estimated
/// revenue per grouping key.
#[derive(Parser)]
#[command(name = "pagestat")]
#[command(about = "Aggregate delimited page view records under a supervised job", long_about = None)]
struct Cli {
    /// Directory containing the input page view files
    input_dir: PathBuf,

    /// Directory the output record is written to
    output_dir: PathBuf,

    /// Reducer parallelism hint (accepted for submission compatibility,
    /// currently not applied anywhere in the pipeline)
    parallel: usize,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    debug!(
        "parallelism hint {} accepted but not applied; reduce stage runs with parallelism 1",
        cli.parallel
    );

    let request = JobRequest::new("load page views", cli.input_dir, cli.output_dir).with_env();
    let job = local::submit(request, Pipeline::new(config.delimiter));

    let supervisor = JobSupervisor::new().with_report_every(config.report_every);
    let mut ticker = IntervalTicker::new(config.poll_interval);
    match supervisor.supervise(&job, &mut ticker).await {
        SupervisionOutcome::Completed => info!("job finished"),
        // Failures were already logged by the supervisor; the process exit
        // code stays zero, matching the log-only failure reporting policy.
        SupervisionOutcome::Failed(failures) => {
            info!("job finished with {} failure(s)", failures.len());
        }
    }
    Ok(())
}
