use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info, warn, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use ising_sim::{run_job, write_results, Job, MagnetoError};

#[derive(Parser)]
#[command(about = "2D Ising model Monte Carlo")]
struct Cli {
    /// Job description (JSON)
    #[arg(long, default_value = "magneto_config.json")]
    config: PathBuf,

    /// Log file, truncated on start
    #[arg(long, default_value = "log.txt")]
    log_file: PathBuf,

    /// Only log to stdout
    #[arg(long)]
    no_log_file: bool,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// Open the log file unless disabled. Failure to open it is returned so it
/// can be reported once logging is up; the run continues on stdout only.
fn open_log_file(cli: &Cli) -> Result<Option<File>, std::io::Error> {
    if cli.no_log_file {
        return Ok(None);
    }
    File::create(&cli.log_file).map(Some)
}

fn init_logging(cli: &Cli) {
    let level = LevelFilter::from_level(cli.log_level);
    let (file, open_error) = match open_log_file(cli) {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };

    let stdout = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(level);
    let file = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(level)
    });
    tracing_subscriber::registry().with(stdout).with(file).init();

    if let Some(e) = open_error {
        warn!(
            "cannot open log file {}: {e}; logging to stdout only",
            cli.log_file.display()
        );
    }
}

fn progress_bar(n: usize) -> ProgressBar {
    let pb = ProgressBar::new(n as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}]",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("temperatures");
    pb
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let job = match Job::load(&cli.config) {
        Ok(job) => job,
        Err(MagnetoError::Io(_)) => {
            error!("No configuration file found at {}", cli.config.display());
            return ExitCode::FAILURE;
        }
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let n_temps = job.temperatures().map(|t| t.len()).unwrap_or(0);
    let pb = progress_bar(n_temps);
    let results = run_job(&job, &|_| pb.inc(1));
    pb.finish_and_clear();

    let results = match results {
        Ok(results) => results,
        // already reported by run_job
        Err(MagnetoError::UnimplementedMode(_)) => return ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_results(&job.physics, &results) {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    info!(n_results = results.len(), "done");
    ExitCode::SUCCESS
}
