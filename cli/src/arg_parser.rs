use clap::Parser;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Run shell commands as separate processes, a bounded number at a time
#[derive(Debug, Parser)]
#[clap(name = "simplejob", version)]
pub struct ArgParser {
    /// Maximum number of jobs running at once
    #[clap(short, long, env = "SIMPLEJOB_WORKERS", default_value = "1")]
    pub workers: NonZeroUsize,

    /// Cancel any job still running after this many seconds
    #[clap(short, long, env = "SIMPLEJOB_TIMEOUT", parse(try_from_str = seconds))]
    pub timeout: Option<Duration>,

    /// How often to poll job status and retry refused submissions, in milliseconds
    #[clap(long = "poll-ms", default_value = "100", parse(try_from_str = millis))]
    pub poll_interval: Duration,

    /// Commands to run, each passed to `sh -c`
    #[clap(required = true)]
    pub commands: Vec<String>,
}

/// try_from_str parse function for fractional seconds
fn seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("invalid number of seconds: {}", s))?;
    Duration::try_from_secs_f64(secs).map_err(|err| err.to_string())
}

fn millis(s: &str) -> Result<Duration, String> {
    match s.parse::<u64>() {
        Ok(0) | Err(_) => Err("Required a positive number of milliseconds".to_string()),
        Ok(ms) => Ok(Duration::from_millis(ms)),
    }
}
