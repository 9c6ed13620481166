mod actors;
pub mod config;
pub mod error;
mod job;
mod status;
pub mod types;
mod work;

// re-export the scheduler handle as if it is the job client itself.
pub use actors::scheduler::JobClientHandle as JobClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use job::Job;
pub use status::JobStatus;
pub use work::Work;
