use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::SystemLayout;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/io.elementary.upgrade.toml";

const CONFIG_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpgradeConfig {
    pub version: u32,
    pub package_manager: String,
    pub retries: u32,
    pub lock_paths: Vec<PathBuf>,
    pub lock_poll_interval_ms: u64,
    pub lock_max_wait_secs: Option<u64>,
    pub apt_config_dir: PathBuf,
    pub release_data_dir: PathBuf,
    pub retirement_markers: Vec<String>,
    pub environment: BTreeMap<String, String>,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FILE_VERSION,
            package_manager: "apt-get".to_string(),
            retries: 3,
            lock_paths: [
                "/var/cache/apt/archives/lock",
                "/var/lib/apt/lists/lock",
                "/var/lib/dpkg/lock",
                "/var/lib/dpkg/lock-frontend",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            lock_poll_interval_ms: 1000,
            lock_max_wait_secs: None,
            apt_config_dir: PathBuf::from("/etc/apt"),
            release_data_dir: PathBuf::from("/usr/share/io.elementary.upgrade"),
            retirement_markers: vec![
                "ppa.launchpad.net/elementary-os".to_string(),
                "packages.elementary.io".to_string(),
            ],
            environment: BTreeMap::from([
                ("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string()),
                ("LC_ALL".to_string(), "C".to_string()),
            ]),
        }
    }
}

impl UpgradeConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read_from(path),
            None => {
                let system_path = Path::new(DEFAULT_CONFIG_PATH);
                if system_path.is_file() {
                    Self::read_from(system_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read upgrade config: {}", path.display()))?;
        Self::parse(&raw)
            .with_context(|| format!("failed to parse upgrade config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config = toml::from_str::<UpgradeConfig>(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.version != CONFIG_FILE_VERSION {
            anyhow::bail!(
                "unsupported config version {} (expected {})",
                self.version,
                CONFIG_FILE_VERSION
            );
        }
        if self.package_manager.trim().is_empty() {
            anyhow::bail!("package_manager must not be empty");
        }
        if self.lock_poll_interval_ms == 0 {
            anyhow::bail!("lock_poll_interval_ms must be greater than zero");
        }
        if self
            .retirement_markers
            .iter()
            .any(|marker| marker.trim().is_empty())
        {
            anyhow::bail!("retirement_markers must not contain empty entries");
        }
        Ok(())
    }

    pub fn attempts(&self) -> u32 {
        self.retries.max(1)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    pub fn lock_max_wait(&self) -> Option<Duration> {
        self.lock_max_wait_secs.map(Duration::from_secs)
    }

    pub fn layout(&self) -> SystemLayout {
        SystemLayout::new(&self.apt_config_dir, &self.release_data_dir)
    }
}
