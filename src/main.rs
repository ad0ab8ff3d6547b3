mod check;
mod config;
mod error;
mod status;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use check::{Evaluation, Evaluator};
use config::{CliArgs, Config};
use error::CheckError;
use status::StatusFileParser;

fn main() {
    let cli_args = CliArgs::parse();

    // Logs go to stderr, stdout belongs to the scheduler
    if let Err(e) = init_logging(&cli_args.log_level) {
        report(&Evaluation::failed(CheckError::Config(e.to_string())), false);
    }

    let config = match Config::load(cli_args) {
        Ok(config) => config,
        Err(e) => report(&Evaluation::failed(CheckError::Config(format!("{:#}", e))), false),
    };

    let status_file = match config.validate() {
        Ok(path) => path,
        Err(e) => report(&Evaluation::failed(e), config.verbose),
    };

    tracing::debug!(
        "Checking {} with thresholds {:?}",
        status_file.display(),
        config.thresholds
    );
    let evaluation = Evaluator::new(StatusFileParser).evaluate(status_file, &config.thresholds, Utc::now());

    report(&evaluation, config.verbose);
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let level = config::parse_log_level(log_level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Print the check output and exit with the matching status code
fn report(evaluation: &Evaluation, verbose: bool) -> ! {
    for line in evaluation.output_lines(verbose) {
        println!("{}", line);
    }
    evaluation.severity.exit()
}
