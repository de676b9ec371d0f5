use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use eos_upgrade_core::UpgradeConfig;
use tracing::{debug, info, warn};

use crate::lock::{is_locked, wait_unlocked_with, LockWaitPolicy};

pub trait PackageManager {
    fn run(&mut self, args: &[&str]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailed {
    pub program: String,
    pub args: Vec<String>,
    pub attempts: u32,
    pub exit_code: i32,
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{} {}' failed after {} attempt(s) with exit code {}",
            self.program,
            self.args.join(" "),
            self.attempts,
            self.exit_code
        )
    }
}

impl std::error::Error for CommandFailed {}

type LockNotice = Box<dyn FnMut(&Path, Duration)>;

pub struct AptRunner {
    program: String,
    environment: BTreeMap<String, String>,
    attempts: u32,
    lock_paths: Vec<PathBuf>,
    lock_policy: LockWaitPolicy,
    lock_notice: LockNotice,
}

impl fmt::Debug for AptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AptRunner")
            .field("program", &self.program)
            .field("environment", &self.environment)
            .field("attempts", &self.attempts)
            .field("lock_paths", &self.lock_paths)
            .field("lock_policy", &self.lock_policy)
            .finish_non_exhaustive()
    }
}

impl AptRunner {
    pub fn from_config(config: &UpgradeConfig) -> Self {
        Self {
            program: config.package_manager.clone(),
            environment: config.environment.clone(),
            attempts: config.attempts(),
            lock_paths: config.lock_paths.clone(),
            lock_policy: LockWaitPolicy {
                poll_interval: config.lock_poll_interval(),
                max_wait: config.lock_max_wait(),
            },
            lock_notice: Box::new(|path, _| {
                info!("Waiting for lock {} to be released", path.display());
            }),
        }
    }

    pub fn with_lock_notice(mut self, notice: impl FnMut(&Path, Duration) + 'static) -> Self {
        self.lock_notice = Box::new(notice);
        self
    }

    pub fn build_command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .envs(&self.environment)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    pub fn wait_for_locks(&mut self) -> Result<()> {
        for path in &self.lock_paths {
            wait_unlocked_with(
                path,
                self.lock_policy,
                is_locked,
                std::thread::sleep,
                &mut self.lock_notice,
            )?;
        }
        Ok(())
    }

    pub fn run_with_executor<Execute>(&mut self, args: &[&str], mut execute: Execute) -> Result<()>
    where
        Execute: FnMut(&mut Command) -> Result<i32>,
    {
        let mut last_code = 0;
        for attempt in 1..=self.attempts {
            self.wait_for_locks()?;

            let mut command = self.build_command(args);
            debug!(program = %self.program, args = ?args, attempt, "running package manager");
            let code = execute(&mut command).with_context(|| {
                format!("failed to run '{} {}'", self.program, args.join(" "))
            })?;
            if code == 0 {
                return Ok(());
            }

            warn!(
                program = %self.program,
                args = ?args,
                attempt,
                attempts = self.attempts,
                exit_code = code,
                "package manager exited with failure"
            );
            last_code = code;
        }

        Err(CommandFailed {
            program: self.program.clone(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            attempts: self.attempts,
            exit_code: last_code,
        }
        .into())
    }
}

impl PackageManager for AptRunner {
    fn run(&mut self, args: &[&str]) -> Result<()> {
        self.run_with_executor(args, execute_command)
    }
}

pub fn execute_command(command: &mut Command) -> Result<i32> {
    let status = command
        .status()
        .with_context(|| format!("command failed to start: {command:?}"))?;
    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    // Shell convention for signal deaths.
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
