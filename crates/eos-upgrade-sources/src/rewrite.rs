use anyhow::{Context, Result};
use regex::Regex;

// `next` also names a template directory, so it must be one plain path
// component. It must not read as a pocket of `current` either, or a rerun
// would match the rewritten lines again.
pub fn check_release_move(current: &str, next: &str) -> Result<()> {
    for release in [current, next] {
        if release.is_empty() || release.chars().all(|ch| ch == '.') {
            anyhow::bail!("invalid release identifier '{release}'");
        }
        if release.chars().any(|ch| ch.is_whitespace() || ch == '/') {
            anyhow::bail!("release identifier '{release}' must not contain whitespace or '/'");
        }
    }
    if current == next {
        anyhow::bail!("current and next release are both '{current}'");
    }
    if next.starts_with(&format!("{current}-")) {
        anyhow::bail!(
            "next release '{next}' would be read as a suite of current release '{current}'"
        );
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ReleaseLineMatcher {
    release: String,
    pattern: Regex,
}

impl ReleaseLineMatcher {
    pub fn new(release: &str) -> Result<Self> {
        if release.trim().is_empty() {
            anyhow::bail!("release identifier must not be empty");
        }
        let pattern = Regex::new(&format!(
            r"^\s*deb(?:-src)?\s+(?:\S+\s+)+?{}(?:-\S+)?(?:\s.*)?$",
            regex::escape(release)
        ))
        .with_context(|| format!("failed to build source line matcher for '{release}'"))?;
        Ok(Self {
            release: release.to_string(),
            pattern,
        })
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRewrite {
    Untouched,
    Rewrite(String),
    Delete,
}

/// Decides what happens to one source file. Matching lines get every
/// occurrence of the current release replaced; a retirement marker in any
/// rewritten line condemns the whole file, including unrelated lines.
pub fn plan_source_rewrite(
    content: &str,
    matcher: &ReleaseLineMatcher,
    next: &str,
    retirement_markers: &[String],
) -> SourceRewrite {
    let mut should_update = false;
    let mut should_delete = false;

    let lines = content
        .split('\n')
        .map(|line| {
            if !matcher.is_match(line) {
                return line.to_string();
            }
            let rewritten = line.replace(matcher.release(), next);
            should_update = true;
            if retirement_markers
                .iter()
                .any(|marker| rewritten.contains(marker.as_str()))
            {
                should_delete = true;
            }
            rewritten
        })
        .collect::<Vec<_>>();

    if should_delete {
        SourceRewrite::Delete
    } else if should_update {
        SourceRewrite::Rewrite(lines.join("\n"))
    } else {
        SourceRewrite::Untouched
    }
}
