use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub fn is_source_file_name(name: &str) -> bool {
    name.contains(".list")
}

pub fn collect_source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    if !root.is_dir() {
        return Ok(paths);
    }

    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("failed reading source directory {}", dir.display()))?
        {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                queue.push_back(path);
            } else if file_type.is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(is_source_file_name)
            {
                paths.push(path);
            }
        }
    }

    paths.sort();
    Ok(paths)
}

pub fn install_release_templates(template_dir: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    if !template_dir.is_dir() {
        warn!(
            template_dir = %template_dir.display(),
            "no release source templates found"
        );
        return Ok(Vec::new());
    }

    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    let mut installed = Vec::new();
    for entry in fs::read_dir(template_dir)
        .with_context(|| format!("failed to read {}", template_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let from_path = entry.path();
        let to_path = destination.join(entry.file_name());
        fs::copy(&from_path, &to_path).with_context(|| {
            format!(
                "failed copying source template from {} to {}",
                from_path.display(),
                to_path.display()
            )
        })?;
        debug!(template = %to_path.display(), "installed release source template");
        installed.push(to_path);
    }

    installed.sort();
    Ok(installed)
}
