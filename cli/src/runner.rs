use joblib::{Job, JobClient, JobStatus, Work};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Final state of one command.
#[derive(Debug)]
pub struct Outcome {
    pub command: String,
    pub job: Job,
    pub status: JobStatus,
}

struct Running {
    command: String,
    job: Job,
    started: Instant,
    cancelled: bool,
}

/// Feeds commands through a `JobClient`, retrying refused submissions and enforcing an optional
/// per-job deadline.
pub struct Runner {
    client: JobClient,
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl Runner {
    pub fn new(client: JobClient, timeout: Option<Duration>, poll_interval: Duration) -> Self {
        Self {
            client,
            timeout,
            poll_interval,
        }
    }

    /// Run every command to completion. Outcomes are in completion order.
    pub async fn run(&self, commands: Vec<String>) -> joblib::Result<Vec<Outcome>> {
        let mut queue = VecDeque::from(commands);
        let mut running = Vec::new();
        let mut outcomes = Vec::with_capacity(queue.len());

        while !queue.is_empty() || !running.is_empty() {
            while let Some(command) = queue.pop_front() {
                match self.client.submit(Work::shell(&command)).await? {
                    Some(job) => {
                        tracing::info!(job_id = job.id(), command = %command, "Submitted");
                        running.push(Running {
                            command,
                            job,
                            started: Instant::now(),
                            cancelled: false,
                        });
                    }
                    None => {
                        // all workers busy, try again next round
                        queue.push_front(command);
                        break;
                    }
                }
            }

            self.poll(&mut running, &mut outcomes);

            if !queue.is_empty() || !running.is_empty() {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        Ok(outcomes)
    }

    fn poll(&self, running: &mut Vec<Running>, outcomes: &mut Vec<Outcome>) {
        running.retain_mut(|entry| {
            let status = entry.job.status();
            if status.is_terminal() {
                tracing::info!(job_id = entry.job.id(), %status, "Job done");
                outcomes.push(Outcome {
                    command: entry.command.clone(),
                    job: entry.job.clone(),
                    status,
                });
                return false;
            }
            if let Some(timeout) = self.timeout {
                if !entry.cancelled && entry.started.elapsed() >= timeout {
                    entry.cancelled = entry.job.cancel();
                    tracing::warn!(
                        job_id = entry.job.id(),
                        timeout = ?timeout,
                        signaled = entry.cancelled,
                        "Job exceeded its deadline"
                    );
                }
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joblib::ClientConfig;
    use std::num::NonZeroUsize;

    fn runner(workers: usize, timeout: Option<Duration>) -> Runner {
        let config = ClientConfig::new(NonZeroUsize::new(workers).unwrap());
        Runner::new(
            JobClient::spawn(config),
            timeout,
            Duration::from_millis(10),
        )
    }

    fn status_of(outcomes: &[Outcome], command: &str) -> JobStatus {
        outcomes
            .iter()
            .find(|outcome| outcome.command == command)
            .map(|outcome| outcome.status)
            .expect("missing outcome")
    }

    #[tokio::test]
    async fn runs_more_commands_than_workers() {
        let commands: Vec<String> = (0..5).map(|i| format!("exit {}", i % 2)).collect();
        let outcomes = runner(2, None).run(commands).await.expect("run");
        assert_eq!(outcomes.len(), 5);

        let mut ids: Vec<_> = outcomes.iter().map(|outcome| outcome.job.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        for outcome in &outcomes {
            let expected = if outcome.command == "exit 1" {
                JobStatus::Error
            } else {
                JobStatus::Finished
            };
            assert_eq!(outcome.status, expected);
        }
    }

    #[tokio::test]
    async fn deadline_cancels_slow_jobs() {
        let commands = vec!["sleep 30".to_string(), "true".to_string()];
        let outcomes = runner(2, Some(Duration::from_millis(200)))
            .run(commands)
            .await
            .expect("run");
        assert_eq!(status_of(&outcomes, "sleep 30"), JobStatus::Cancelled);
        assert_eq!(status_of(&outcomes, "true"), JobStatus::Finished);
    }

    #[tokio::test]
    async fn single_worker_runs_in_submission_order() {
        let commands = vec!["true".to_string(), "exit 3".to_string(), "true".to_string()];
        let outcomes = runner(1, None).run(commands).await.expect("run");
        let ids: Vec<_> = outcomes.iter().map(|outcome| outcome.job.id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(outcomes[1].status, JobStatus::Error);
    }

    #[tokio::test]
    async fn no_commands_is_a_noop() {
        let outcomes = runner(1, None).run(vec![]).await.expect("run");
        assert!(outcomes.is_empty());
    }
}
