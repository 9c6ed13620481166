mod actor;
mod messages;

use self::{
    actor::Scheduler,
    messages::SchedulerMessage::{self, Submit, Tracked},
};
use crate::config::ClientConfig;
use crate::error::{self, Error};
use crate::job::Job;
use crate::work::Work;
use std::num::NonZeroUsize;
use tokio::sync::{mpsc, oneshot};

/// A `JobClient` runs work in separate OS processes, never more than `workers` at a time.
///
/// This struct is actually an actor handle; the tracked jobs live in the actor spawned by
/// `JobClient::spawn`. Every request is served by that single actor, so clones of the handle can
/// submit from any task or thread without over-admitting. When the last handle is dropped the actor
/// stops; jobs that are still running keep running.
#[derive(Clone, Debug)]
pub struct JobClientHandle {
    sender: mpsc::Sender<SchedulerMessage>,
    workers: NonZeroUsize,
}

impl JobClientHandle {
    /// Spawn a new scheduler. Must be called from within a tokio runtime.
    pub fn spawn(config: ClientConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.inbox_capacity.max(1));
        Scheduler::spawn(receiver, config.workers);
        Self {
            sender,
            workers: config.workers,
        }
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    /// Submit work to run in a new process.
    ///
    /// Completed jobs are dropped from the tracked set first. Returns `Ok(None)` when every worker
    /// slot is still taken; nothing is queued, so retrying later is up to the caller. A failure to
    /// spawn the process is returned as an error.
    pub async fn submit(&self, work: Work) -> error::Result<Option<Job>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Submit { work, response: tx })
            .await
            .map_err(|_| Error::ClientClosed)?;
        rx.await.map_err(|_| Error::ClientClosed)?
    }

    /// Snapshot of the tracked jobs in submission order. Does not clean anything up, so jobs that
    /// completed since the last `submit` are still listed.
    pub async fn tracked(&self) -> error::Result<Vec<Job>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Tracked { response: tx })
            .await
            .map_err(|_| Error::ClientClosed)?;
        rx.await.map_err(|_| Error::ClientClosed)
    }
}
