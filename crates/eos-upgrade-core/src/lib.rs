mod config;
mod layout;
mod progress;
mod stage;

pub use config::{UpgradeConfig, DEFAULT_CONFIG_PATH};
pub use layout::SystemLayout;
pub use progress::{parse_status_line, status_line, ProgressReporter, STATUS_PREFIX};
pub use stage::Stage;

#[cfg(test)]
mod tests;
