use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use eos_upgrade_core::{ProgressReporter, Stage, SystemLayout};
use tracing::info;

use crate::fs_ops::{collect_source_files, install_release_templates};
use crate::rewrite::{check_release_move, plan_source_rewrite, ReleaseLineMatcher, SourceRewrite};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub rewritten: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub untouched: Vec<PathBuf>,
    pub templates_installed: Vec<PathBuf>,
}

pub fn update_channels<W: Write>(
    layout: &SystemLayout,
    current: &str,
    next: &str,
    retirement_markers: &[String],
    progress: &mut ProgressReporter<W>,
) -> Result<MigrationReport> {
    check_release_move(current, next)?;
    progress.print_status(Stage::UpdateChannels, 0)?;

    let matcher = ReleaseLineMatcher::new(current)?;
    let files = collect_source_files(layout.apt_config_dir())?;
    let total = files.len();
    let mut report = MigrationReport::default();

    for (index, path) in files.into_iter().enumerate() {
        progress.print_status(Stage::UpdateChannels, ((index * 100) / total) as u8)?;

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read source file: {}", path.display()))?;
        match plan_source_rewrite(&content, &matcher, next, retirement_markers) {
            SourceRewrite::Delete => {
                fs::remove_file(&path).with_context(|| {
                    format!("failed to delete retired source file: {}", path.display())
                })?;
                info!(path = %path.display(), "deleted retired source file");
                report.deleted.push(path);
            }
            SourceRewrite::Rewrite(updated) => {
                fs::write(&path, updated.as_bytes()).with_context(|| {
                    format!("failed to rewrite source file: {}", path.display())
                })?;
                info!(path = %path.display(), current, next, "rewrote source file");
                report.rewritten.push(path);
            }
            SourceRewrite::Untouched => report.untouched.push(path),
        }
    }

    report.templates_installed = install_release_templates(
        &layout.release_sources_template_dir(next),
        &layout.sources_list_dir(),
    )?;

    progress.print_status(Stage::UpdateChannels, 100)?;
    Ok(report)
}
