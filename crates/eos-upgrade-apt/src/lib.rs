mod lock;
mod runner;

pub use lock::{is_locked, wait_unlocked, wait_unlocked_with, LockWaitPolicy, LockWaitTimedOut};
pub use runner::{execute_command, AptRunner, CommandFailed, PackageManager};
