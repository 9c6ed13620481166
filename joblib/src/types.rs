use std::path::PathBuf;

pub type JobId = u64;
pub type Program = String;
pub type Args = Vec<String>;
pub type Dir = PathBuf;
pub type Envs = Vec<(String, String)>;
