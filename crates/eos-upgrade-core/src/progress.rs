use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::Stage;

pub const STATUS_PREFIX: &str = "io.elementary.upgrade.";

#[derive(Debug)]
pub struct ProgressReporter<W: Write> {
    out: W,
}

impl ProgressReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print_status(&mut self, stage: Stage, percent: u8) -> Result<()> {
        let line = status_line(stage, percent);
        writeln!(self.out, "{line}")
            .and_then(|_| self.out.flush())
            .with_context(|| format!("failed to emit progress line '{line}'"))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn status_line(stage: Stage, percent: u8) -> String {
    format!("{STATUS_PREFIX}{}: {}%", stage.as_str(), percent.min(100))
}

pub fn parse_status_line(line: &str) -> Option<(Stage, u8)> {
    let rest = line.trim_end().strip_prefix(STATUS_PREFIX)?;
    let (stage, percent) = rest.split_once(": ")?;
    let stage = Stage::parse(stage)?;
    let percent = percent.strip_suffix('%')?.parse::<u8>().ok()?;
    if percent > 100 {
        return None;
    }
    Some((stage, percent))
}
