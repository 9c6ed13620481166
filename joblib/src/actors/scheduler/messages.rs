use crate::error;
use crate::job::Job;
use crate::work::Work;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum SchedulerMessage {
    Submit {
        work: Work,
        response: oneshot::Sender<error::Result<Option<Job>>>,
    },
    Tracked {
        response: oneshot::Sender<Vec<Job>>,
    },
}
