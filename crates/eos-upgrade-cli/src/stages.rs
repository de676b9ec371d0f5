use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use eos_upgrade_apt::PackageManager;
use eos_upgrade_core::{ProgressReporter, Stage, SystemLayout};
use tracing::info;

pub(crate) const REFRESH_INDEX: &[&str] = &["update"];
// Upgrades keep locally modified conffiles without prompting.
pub(crate) const FULL_UPGRADE: &[&str] = &[
    "-y",
    "-o",
    "Dpkg::Options::=--force-confdef",
    "-o",
    "Dpkg::Options::=--force-confold",
    "dist-upgrade",
];
pub(crate) const DOWNLOAD_UPGRADE: &[&str] = &["-y", "--download-only", "dist-upgrade"];
pub(crate) const OFFLINE_UPGRADE: &[&str] = &[
    "-y",
    "--no-download",
    "--ignore-missing",
    "-o",
    "Dpkg::Options::=--force-confdef",
    "-o",
    "Dpkg::Options::=--force-confold",
    "dist-upgrade",
];
pub(crate) const CLEAN: &[&str] = &["clean"];
pub(crate) const AUTOCLEAN: &[&str] = &["autoclean"];
pub(crate) const AUTOREMOVE: &[&str] = &["-y", "autoremove"];

#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelMove<'a> {
    pub(crate) layout: &'a SystemLayout,
    pub(crate) current: &'a str,
    pub(crate) next: &'a str,
    pub(crate) retirement_markers: &'a [String],
}

pub(crate) fn prepare<P, W>(apt: &mut P, progress: &mut ProgressReporter<W>) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    run_checkpointed(
        Stage::Prepare,
        &[REFRESH_INDEX, FULL_UPGRADE, CLEAN, AUTOCLEAN, AUTOREMOVE],
        apt,
        progress,
    )
}

pub(crate) fn update_channels<W: Write>(
    channel_move: ChannelMove<'_>,
    progress: &mut ProgressReporter<W>,
) -> Result<()> {
    info!(
        stage = %Stage::UpdateChannels,
        current = channel_move.current,
        next = channel_move.next,
        "starting stage"
    );
    let report = eos_upgrade_sources::update_channels(
        channel_move.layout,
        channel_move.current,
        channel_move.next,
        channel_move.retirement_markers,
        progress,
    )?;
    info!(
        rewritten = report.rewritten.len(),
        deleted = report.deleted.len(),
        untouched = report.untouched.len(),
        templates = report.templates_installed.len(),
        "channels updated"
    );
    Ok(())
}

pub(crate) fn download<P, W>(apt: &mut P, progress: &mut ProgressReporter<W>) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    run_checkpointed(
        Stage::Download,
        &[REFRESH_INDEX, DOWNLOAD_UPGRADE],
        apt,
        progress,
    )
}

pub(crate) fn install<P, W>(apt: &mut P, progress: &mut ProgressReporter<W>) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    run_checkpointed(Stage::Install, &[OFFLINE_UPGRADE], apt, progress)
}

pub(crate) fn clean_up<P, W>(apt: &mut P, progress: &mut ProgressReporter<W>) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    run_checkpointed(
        Stage::CleanUp,
        &[CLEAN, AUTOCLEAN, AUTOREMOVE],
        apt,
        progress,
    )
}

pub(crate) fn upgrade<P, W>(
    apt: &mut P,
    channel_move: ChannelMove<'_>,
    progress: &mut ProgressReporter<W>,
) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    prepare(apt, progress)?;
    update_channels(channel_move, progress)?;
    download(apt, progress)?;
    install(apt, progress)?;
    clean_up(apt, progress)
}

pub(crate) fn simulate_upgrade<W, Sleep>(
    progress: &mut ProgressReporter<W>,
    delay: Duration,
    mut sleep: Sleep,
) -> Result<()>
where
    W: Write,
    Sleep: FnMut(Duration),
{
    for stage in Stage::ALL {
        info!(stage = %stage, "simulating stage");
        for &percent in stage.checkpoints() {
            progress.print_status(stage, percent)?;
            if percent < 100 {
                sleep(delay);
            }
        }
    }
    Ok(())
}

fn run_checkpointed<P, W>(
    stage: Stage,
    commands: &[&[&str]],
    apt: &mut P,
    progress: &mut ProgressReporter<W>,
) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    info!(stage = %stage, "starting stage");
    for (args, &percent) in commands.iter().zip(stage.checkpoints()) {
        progress.print_status(stage, percent)?;
        apt.run(args)?;
    }
    progress.print_status(stage, 100)
}
