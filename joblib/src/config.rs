use std::num::NonZeroUsize;

const DEFAULT_INBOX_CAPACITY: usize = 32;

/// Configuration for a [`JobClient`](crate::JobClient). Fixed for the client's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum number of jobs tracked at once.
    pub workers: NonZeroUsize,
    /// Capacity of the scheduler's message queue. This limits the build-up of inbound requests.
    pub inbox_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::MIN,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
        }
    }
}

impl ClientConfig {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    pub fn with_inbox_capacity(mut self, inbox_capacity: usize) -> Self {
        // tokio channels panic on a zero buffer
        self.inbox_capacity = inbox_capacity.max(1);
        self
    }
}
