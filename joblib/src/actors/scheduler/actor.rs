use super::messages::SchedulerMessage;
use crate::error;
use crate::job::Job;
use crate::types::JobId;
use crate::work::Work;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use tokio::sync::mpsc;

/// Owns every tracked job. Messages are handled one at a time, so each submission's
/// cleanup, capacity check and registration happen without interleaving.
pub struct Scheduler {
    inbox: mpsc::Receiver<SchedulerMessage>,
    workers: NonZeroUsize,
    next_id: JobId,
    // ids only grow, so key order is submission order
    jobs: BTreeMap<JobId, Job>,
}

impl Scheduler {
    pub fn spawn(inbox: mpsc::Receiver<SchedulerMessage>, workers: NonZeroUsize) {
        let actor = Self {
            inbox,
            workers,
            next_id: 0,
            jobs: BTreeMap::new(),
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::SchedulerMessage::*;
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Submit { work, response } => {
                    if let Err(Ok(Some(job))) = response.send(self.submit(work)) {
                        // the job stays tracked and counts against capacity until it is done
                        tracing::debug!(
                            job_id = job.id(),
                            "Submitter went away before receiving its job"
                        );
                    }
                }
                Tracked { response } => {
                    let _ = response.send(self.jobs.values().cloned().collect());
                }
            }
        }
        // every client handle is gone; running jobs are left alone
        tracing::debug!(tracked = self.jobs.len(), "Job client shut down");
    }

    fn submit(&mut self, work: Work) -> error::Result<Option<Job>> {
        self.cleanup_completed_jobs();
        if self.jobs.len() >= self.workers.get() {
            tracing::debug!(workers = self.workers.get(), "No available workers to run job");
            return Ok(None);
        }

        let job_id = self.next_id;
        self.next_id += 1;

        let job = Job::new(job_id);
        let child = work.command().spawn()?;
        tracing::info!(
            job_id,
            pid = ?child.id(),
            program = work.program(),
            "Started job"
        );
        job.attach(child);
        self.jobs.insert(job_id, job.clone());
        Ok(Some(job))
    }

    fn cleanup_completed_jobs(&mut self) {
        self.jobs.retain(|&job_id, job| {
            let done = job.done();
            if done {
                tracing::debug!(job_id, status = %job.status(), "Cleaning up job");
            }
            !done
        });
    }
}
