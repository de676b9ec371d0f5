use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use eos_upgrade_apt::{AptRunner, CommandFailed, PackageManager};
use eos_upgrade_core::{ProgressReporter, SystemLayout, UpgradeConfig};

use crate::render::{current_output_style, render_lock_notice, render_status_line};
use crate::stages::{
    clean_up, download, install, prepare, simulate_upgrade, update_channels, upgrade, ChannelMove,
};
use crate::{ActionFlags, Cli};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Upgrade,
    Test,
    Prepare,
    UpdateChannels,
    Download,
    Install,
    CleanUp,
}

impl Action {
    pub(crate) fn flag(self) -> &'static str {
        match self {
            Self::Upgrade => "--upgrade",
            Self::Test => "--test",
            Self::Prepare => "--prepare",
            Self::UpdateChannels => "--update-channels",
            Self::Download => "--download",
            Self::Install => "--install",
            Self::CleanUp => "--clean-up",
        }
    }

    pub(crate) fn needs_releases(self) -> bool {
        matches!(self, Self::Upgrade | Self::Test | Self::UpdateChannels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReleasePair {
    pub(crate) current: String,
    pub(crate) next: String,
}

pub(crate) fn selected_action(flags: &ActionFlags) -> Action {
    if flags.upgrade {
        Action::Upgrade
    } else if flags.test {
        Action::Test
    } else if flags.prepare {
        Action::Prepare
    } else if flags.update_channels {
        Action::UpdateChannels
    } else if flags.download {
        Action::Download
    } else if flags.install {
        Action::Install
    } else {
        Action::CleanUp
    }
}

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let action = selected_action(&cli.action);
    let releases = if action.needs_releases() {
        Some(resolve_releases(
            action,
            cli.current.as_deref(),
            cli.next.as_deref(),
        )?)
    } else {
        None
    };

    let mut config = UpgradeConfig::load(cli.config.as_deref())?;
    if let Some(secs) = cli.lock_timeout {
        config.lock_max_wait_secs = Some(secs);
    }

    let style = current_output_style();
    let mut apt = AptRunner::from_config(&config).with_lock_notice(move |path, waited| {
        eprintln!(
            "{}",
            render_status_line(style, "wait", &render_lock_notice(path, waited))
        );
    });
    let layout = config.layout();
    let mut progress = ProgressReporter::stdout();

    run_action(
        action,
        releases.as_ref(),
        &mut apt,
        ActionContext {
            layout: &layout,
            retirement_markers: &config.retirement_markers,
            simulate_delay: Duration::from_millis(cli.simulate_delay_ms),
        },
        &mut progress,
    )
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ActionContext<'a> {
    pub(crate) layout: &'a SystemLayout,
    pub(crate) retirement_markers: &'a [String],
    pub(crate) simulate_delay: Duration,
}

pub(crate) fn run_action<P, W>(
    action: Action,
    releases: Option<&ReleasePair>,
    apt: &mut P,
    context: ActionContext<'_>,
    progress: &mut ProgressReporter<W>,
) -> Result<()>
where
    P: PackageManager,
    W: Write,
{
    match action {
        Action::Upgrade => {
            let channel_move = channel_move(action, releases, context)?;
            upgrade(apt, channel_move, progress)
        }
        Action::Test => {
            channel_move(action, releases, context)?;
            simulate_upgrade(progress, context.simulate_delay, thread::sleep)
        }
        Action::Prepare => prepare(apt, progress),
        Action::UpdateChannels => {
            let channel_move = channel_move(action, releases, context)?;
            update_channels(channel_move, progress)
        }
        Action::Download => download(apt, progress),
        Action::Install => install(apt, progress),
        Action::CleanUp => clean_up(apt, progress),
    }
}

fn channel_move<'a>(
    action: Action,
    releases: Option<&'a ReleasePair>,
    context: ActionContext<'a>,
) -> Result<ChannelMove<'a>> {
    let Some(releases) = releases else {
        anyhow::bail!(
            "--current and --next are required for {}",
            action.flag()
        );
    };
    Ok(ChannelMove {
        layout: context.layout,
        current: &releases.current,
        next: &releases.next,
        retirement_markers: context.retirement_markers,
    })
}

pub(crate) fn resolve_releases(
    action: Action,
    current: Option<&str>,
    next: Option<&str>,
) -> Result<ReleasePair> {
    let (Some(current), Some(next)) = (current, next) else {
        anyhow::bail!(
            "--current and --next are required for {}",
            action.flag()
        );
    };
    validate_release_identifier("--current", current)?;
    validate_release_identifier("--next", next)?;
    eos_upgrade_sources::check_release_move(current, next)?;
    Ok(ReleasePair {
        current: current.to_string(),
        next: next.to_string(),
    })
}

fn validate_release_identifier(flag: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("{flag} must not be empty");
    }
    if value.chars().all(|ch| ch == '.') {
        anyhow::bail!("{flag} '{value}' is not a release identifier");
    }
    if value.chars().any(|ch| ch.is_whitespace() || ch == '/') {
        anyhow::bail!("{flag} '{value}' must not contain whitespace or '/'");
    }
    Ok(())
}

pub(crate) fn exit_code_for_error(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CommandFailed>())
        .and_then(|failed| u8::try_from(failed.exit_code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
