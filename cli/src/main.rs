mod arg_parser;
mod runner;

use arg_parser::ArgParser;
use joblib::{ClientConfig, JobClient, JobStatus};
use runner::Runner;

use clap::Parser;
use std::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ArgParser::parse();
    let client = JobClient::spawn(ClientConfig::new(args.workers));
    let runner = Runner::new(client, args.timeout, args.poll_interval);

    let total = args.commands.len();
    let outcomes = runner.run(args.commands).await?;

    let mut failed = 0;
    for outcome in &outcomes {
        println!("{}\t{}\t{}", outcome.job.id(), outcome.status, outcome.command);
        if outcome.status != JobStatus::Finished {
            eprintln!("{}", outcome.job.failure_detail());
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} jobs did not finish cleanly", failed, total).into());
    }
    Ok(())
}
