use std::{io, result};
use thiserror;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to spawn job process: {0}")]
    Spawn(#[from] io::Error),
    #[error("job client has shut down")]
    ClientClosed,
}

pub type Result<T> = result::Result<T, Error>;
