use crate::types::{Args, Dir, Envs, Program};
use std::{env, io};
use tokio::process;

/// A unit of work: the program a job runs and everything needed to launch it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Work {
    program: Program,
    args: Args,
    dir: Option<Dir>,
    envs: Envs,
}

impl Work {
    pub fn new(program: impl Into<Program>) -> Self {
        Self {
            program: program.into(),
            args: Args::new(),
            dir: None,
            envs: Envs::new(),
        }
    }

    /// Run `script` with `sh -c`.
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    /// Re-run the current executable with `args`, so a binary can dispatch
    /// one of its own entry points into a separate process.
    pub fn current_exe<I, S>(args: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let exe = env::current_exe()?;
        Ok(Self::new(exe.to_string_lossy().into_owned()).args(args))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<Dir>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.envs.push((key.into(), val.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(envs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Build the OS command for this work.
    ///
    /// The child is detached from the parent's lifetime: it is never killed when its handle is
    /// dropped, and on unix it gets its own process group so terminal signals aimed at the parent
    /// don't reach it.
    pub(crate) fn command(&self) -> process::Command {
        let mut command = process::Command::new(&self.program);
        command
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .kill_on_drop(false);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}
