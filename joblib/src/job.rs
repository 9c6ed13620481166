use crate::status::JobStatus;
use crate::types::JobId;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::process::Child;

/// The worker process behind a job, if one has been started.
#[derive(Debug)]
enum Process {
    Pending,
    Attached {
        child: Child,
        // process group led by the child, captured at spawn
        group: Option<u32>,
    },
}

/// A handle to one unit of work running in its own OS process.
///
/// Handles are cheap to clone; every clone observes the same process. Status is read from the OS on
/// every call, so polling always reflects the latest state of the child.
#[derive(Clone, Debug)]
pub struct Job {
    id: JobId,
    process: Arc<Mutex<Process>>,
}

impl Job {
    pub(crate) fn new(id: JobId) -> Self {
        Self {
            id,
            process: Arc::new(Mutex::new(Process::Pending)),
        }
    }

    /// Attach a started process. A job only ever moves from pending to attached, never back.
    pub(crate) fn attach(&self, child: Child) {
        let mut process = self.lock();
        debug_assert!(matches!(*process, Process::Pending), "job {} already attached", self.id);
        if let Process::Pending = *process {
            let group = child.id();
            *process = Process::Attached { child, group };
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    /// OS process id, while the child has not been reaped.
    pub fn pid(&self) -> Option<u32> {
        match &*self.lock() {
            Process::Pending => None,
            Process::Attached { child, .. } => child.id(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match &mut *self.lock() {
            Process::Pending => JobStatus::Pending,
            Process::Attached { child, .. } => match child.try_wait() {
                Ok(None) => JobStatus::Running,
                Ok(Some(exit_status)) => JobStatus::from_exit(exit_status),
                Err(err) => {
                    // no way to tell how it ended
                    tracing::warn!(job_id = self.id, error = %err, "Failed to read job wait state");
                    JobStatus::Cancelled
                }
            },
        }
    }

    pub fn done(&self) -> bool {
        self.status().is_terminal()
    }

    /// Ask the worker process to terminate.
    ///
    /// On unix this sends SIGTERM to the job's whole process group, so anything the worker started
    /// goes down with it and gets a chance to clean up. Elsewhere the child is killed outright.
    ///
    /// Returns true if a live process was signaled. Does not wait for the process to exit, so
    /// `status` may keep reporting `Running` for a short while afterwards.
    pub fn cancel(&self) -> bool {
        let mut process = self.lock();
        let (child, group) = match &mut *process {
            Process::Pending => return false,
            Process::Attached { child, group } => (child, *group),
        };
        if !matches!(child.try_wait(), Ok(None)) {
            return false;
        }
        match terminate(child, group) {
            Ok(()) => {
                tracing::debug!(job_id = self.id, group = ?group, "Sent terminate signal to job");
                true
            }
            Err(err) => {
                tracing::debug!(job_id = self.id, error = %err, "Job could not be signaled");
                false
            }
        }
    }

    /// Describe an abnormal end of this job.
    ///
    /// The child's own error output or panic payload is never carried back across the process
    /// boundary; this only confirms which job went wrong.
    pub fn failure_detail(&self) -> String {
        format!(
            "Job with ID '{}' was killed or encountered an unhandled exception.",
            self.id
        )
    }

    fn lock(&self) -> MutexGuard<'_, Process> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child, group: Option<u32>) -> io::Result<()> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match group {
        Some(pgid) => killpg(Pid::from_raw(pgid as i32), Signal::SIGTERM).map_err(io::Error::from),
        None => child.start_kill(),
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, _group: Option<u32>) -> io::Result<()> {
    child.start_kill()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::Work;
    use std::time::Duration;

    async fn settle(job: &Job) -> JobStatus {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let status = job.status();
                if status.is_terminal() {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("job did not finish in time")
    }

    fn start(id: JobId, work: Work) -> Job {
        let job = Job::new(id);
        job.attach(work.command().spawn().expect("spawn"));
        job
    }

    #[test]
    fn pending_job() {
        let job = Job::new(7);
        assert_eq!(job.id(), 7);
        assert_eq!(job.status(), JobStatus::Pending);
        assert!(!job.done());
        assert!(!job.cancel());
        assert_eq!(job.pid(), None);
    }

    #[test]
    fn failure_detail_cites_id() {
        let job = Job::new(3);
        assert_eq!(
            job.failure_detail(),
            "Job with ID '3' was killed or encountered an unhandled exception."
        );
    }

    #[tokio::test]
    async fn clean_exit_finishes() {
        let job = start(0, Work::new("true"));
        assert_eq!(settle(&job).await, JobStatus::Finished);
        assert!(job.done());
    }

    #[tokio::test]
    async fn nonzero_exit_is_error() {
        let job = start(0, Work::shell("exit 2"));
        assert_eq!(settle(&job).await, JobStatus::Error);
        assert!(job.done());
    }

    #[tokio::test]
    async fn cancel_running_job() {
        let job = start(0, Work::new("sleep").arg("30"));
        assert_eq!(job.status(), JobStatus::Running);
        assert!(job.pid().is_some());
        assert!(job.cancel());
        assert_eq!(settle(&job).await, JobStatus::Cancelled);
    }

    fn processes_matching(pattern: &str) -> String {
        let output = std::process::Command::new("pgrep")
            .args(["-f", pattern])
            .output()
            .expect("pgrep");
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    #[tokio::test]
    async fn cancel_stops_the_whole_process_group() {
        let job = start(0, Work::shell("sleep 41; true"));
        // let sh fork its sleep before signaling
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(job.cancel());
        assert_eq!(settle(&job).await, JobStatus::Cancelled);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !processes_matching("sleep 41").is_empty() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("sleep outlived its cancelled job");
    }

    #[tokio::test]
    async fn cancel_after_exit_is_noop() {
        let job = start(0, Work::new("true"));
        settle(&job).await;
        assert!(!job.cancel());
        assert_eq!(job.status(), JobStatus::Finished);
    }

    #[tokio::test]
    async fn terminal_status_is_sticky() {
        let job = start(0, Work::shell("exit 3"));
        let clone = job.clone();
        assert_eq!(settle(&job).await, JobStatus::Error);
        for _ in 0..10 {
            assert_eq!(clone.status(), JobStatus::Error);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}
