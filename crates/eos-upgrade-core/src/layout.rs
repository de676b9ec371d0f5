use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemLayout {
    apt_config_dir: PathBuf,
    release_data_dir: PathBuf,
}

impl SystemLayout {
    pub fn new(apt_config_dir: impl Into<PathBuf>, release_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            apt_config_dir: apt_config_dir.into(),
            release_data_dir: release_data_dir.into(),
        }
    }

    pub fn apt_config_dir(&self) -> &Path {
        &self.apt_config_dir
    }

    pub fn release_data_dir(&self) -> &Path {
        &self.release_data_dir
    }

    pub fn sources_list_dir(&self) -> PathBuf {
        self.apt_config_dir.join("sources.list.d")
    }

    pub fn release_dir(&self, release: &str) -> PathBuf {
        self.release_data_dir.join(release)
    }

    pub fn release_sources_template_dir(&self, release: &str) -> PathBuf {
        self.release_dir(release).join("sources.list.d")
    }
}
