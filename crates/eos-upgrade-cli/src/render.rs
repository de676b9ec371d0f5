use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};

// Stderr only; stdout carries the progress protocol.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!(
            "{} {message}",
            colorize(badge_style(status), &status_badge(status))
        ),
    }
}

pub(crate) fn render_lock_notice(path: &Path, waited: Duration) -> String {
    if waited.is_zero() {
        format!("Waiting for {} to be released", path.display())
    } else {
        format!(
            "Waiting for {} to be released ({}s elapsed)",
            path.display(),
            waited.as_secs()
        )
    }
}

fn status_badge(status: &str) -> String {
    match status {
        "ok" => "[OK]".to_string(),
        "wait" => "[WAIT]".to_string(),
        "warn" => "[WARN]".to_string(),
        "error" => "[ERR]".to_string(),
        other => format!("[{}]", other.to_ascii_uppercase()),
    }
}

fn badge_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::BrightGreen,
        "wait" => AnsiColor::BrightCyan,
        "warn" => AnsiColor::BrightYellow,
        "error" => AnsiColor::BrightRed,
        _ => AnsiColor::BrightBlue,
    };
    Style::new()
        .fg_color(Some(color.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
