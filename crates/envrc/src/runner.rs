//! Thin wrapper over OS process spawning.

use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// A program invocation: no shell is involved, arguments are passed as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
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

    /// Run the program from `dir` instead of the current working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes external programs on behalf of the updater.
pub trait CommandRunner {
    /// Run `command` to completion and return its standard output verbatim.
    ///
    /// A spawn failure or a non-zero exit status is an error.
    fn capture(&self, command: &CommandSpec) -> impl Future<Output = Result<String>> + Send;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn capture(&self, command: &CommandSpec) -> Result<String> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %command, "Running command");

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", command.program.display()))?;

        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                command.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        String::from_utf8(output.stdout).with_context(|| {
            format!(
                "Output of {} is not valid UTF-8",
                command.program.display()
            )
        })
    }
}
