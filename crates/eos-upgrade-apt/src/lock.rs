use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use fs4::FileExt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockWaitPolicy {
    pub poll_interval: Duration,
    pub max_wait: Option<Duration>,
}

impl Default for LockWaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_wait: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockWaitTimedOut {
    pub path: PathBuf,
    pub waited: Duration,
}

impl fmt::Display for LockWaitTimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up waiting for lock {} after {}s",
            self.path.display(),
            self.waited.as_secs()
        )
    }
}

impl std::error::Error for LockWaitTimedOut {}

/// Point-in-time probe: opens (creating if absent) and tries a non-blocking
/// exclusive lock. Any failure counts as held. The lock is released when the
/// handle drops at return.
pub fn is_locked(path: &Path) -> bool {
    let file = match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
    {
        Ok(file) => file,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "lock probe could not open path");
            return true;
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => false,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "lock probe found lock held");
            true
        }
    }
}

pub fn wait_unlocked(path: &Path, policy: LockWaitPolicy) -> Result<()> {
    wait_unlocked_with(path, policy, is_locked, thread::sleep, |path, _| {
        info!("Waiting for lock {} to be released", path.display());
    })
}

pub fn wait_unlocked_with<Probe, Sleep, Notice>(
    path: &Path,
    policy: LockWaitPolicy,
    mut probe: Probe,
    mut sleep: Sleep,
    mut notice: Notice,
) -> Result<()>
where
    Probe: FnMut(&Path) -> bool,
    Sleep: FnMut(Duration),
    Notice: FnMut(&Path, Duration),
{
    let mut waited = Duration::ZERO;
    while probe(path) {
        if let Some(max_wait) = policy.max_wait {
            if waited >= max_wait {
                return Err(LockWaitTimedOut {
                    path: path.to_path_buf(),
                    waited,
                }
                .into());
            }
        }
        notice(path, waited);
        sleep(policy.poll_interval);
        waited += policy.poll_interval;
    }
    if !waited.is_zero() {
        debug!(path = %path.display(), waited_ms = waited.as_millis() as u64, "lock released");
    }
    Ok(())
}
