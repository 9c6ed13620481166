use std::fmt;
use std::process::ExitStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// No process has been attached yet.
    Pending,
    Running,
    Finished,
    /// The process ended without an exit code, e.g. it was killed by a signal.
    Cancelled,
    /// The process exited with a positive exit code.
    Error,
}

impl JobStatus {
    /// Map the exit status of a process that is no longer alive.
    pub(crate) fn from_exit(exit_status: ExitStatus) -> Self {
        match exit_status.code() {
            None => JobStatus::Cancelled,
            Some(code) if code > 0 => JobStatus::Error,
            Some(_) => JobStatus::Finished,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Cancelled | JobStatus::Error
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}
