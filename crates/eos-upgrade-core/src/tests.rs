use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::*;

#[test]
fn stages_run_in_upgrade_order() {
    assert_eq!(
        Stage::ALL.map(Stage::as_str),
        ["PREPARE", "UPDATE_CHANNELS", "DOWNLOAD", "INSTALL", "CLEAN_UP"]
    );
    let mut sorted = Stage::ALL;
    sorted.sort();
    assert_eq!(sorted, Stage::ALL);
}

#[test]
fn stage_parse_accepts_protocol_names_only() {
    for stage in Stage::ALL {
        assert_eq!(Stage::parse(stage.as_str()), Some(stage));
    }
    assert_eq!(Stage::parse("prepare"), None);
    assert_eq!(Stage::parse("CLEANUP"), None);
}

#[test]
fn stage_checkpoints_are_monotonic_and_bounded() {
    for stage in Stage::ALL {
        let checkpoints = stage.checkpoints();
        assert_eq!(checkpoints.first(), Some(&0), "{stage} must start at 0");
        assert_eq!(checkpoints.last(), Some(&100), "{stage} must end at 100");
        assert!(
            checkpoints.windows(2).all(|pair| pair[0] <= pair[1]),
            "{stage} checkpoints must not decrease"
        );
    }
}

#[test]
fn status_line_matches_protocol() {
    assert_eq!(
        status_line(Stage::UpdateChannels, 40),
        "io.elementary.upgrade.UPDATE_CHANNELS: 40%"
    );
    assert_eq!(
        status_line(Stage::CleanUp, 250),
        "io.elementary.upgrade.CLEAN_UP: 100%"
    );
}

#[test]
fn progress_reporter_writes_one_line_per_event() {
    let mut reporter = ProgressReporter::new(Vec::new());
    reporter
        .print_status(Stage::Download, 0)
        .expect("must write progress");
    reporter
        .print_status(Stage::Download, 50)
        .expect("must write progress");

    let output = String::from_utf8(reporter.into_inner()).expect("utf-8 output");
    assert_eq!(
        output,
        "io.elementary.upgrade.DOWNLOAD: 0%\nio.elementary.upgrade.DOWNLOAD: 50%\n"
    );
}

#[test]
fn parse_status_line_reads_back_emitted_lines() {
    assert_eq!(
        parse_status_line("io.elementary.upgrade.INSTALL: 100%\n"),
        Some((Stage::Install, 100))
    );
    assert_eq!(
        parse_status_line("io.elementary.upgrade.PREPARE: 20%"),
        Some((Stage::Prepare, 20))
    );
}

#[test]
fn parse_status_line_rejects_foreign_lines() {
    assert_eq!(parse_status_line("Reading package lists..."), None);
    assert_eq!(parse_status_line("io.elementary.upgrade.PREPARE: 20"), None);
    assert_eq!(parse_status_line("io.elementary.upgrade.PREPARE: 120%"), None);
    assert_eq!(parse_status_line("io.elementary.upgrade.REBOOT: 0%"), None);
}

#[test]
fn default_config_targets_apt_and_dpkg_locks() {
    let config = UpgradeConfig::default();
    assert_eq!(config.package_manager, "apt-get");
    assert_eq!(config.attempts(), 3);
    assert_eq!(
        config.lock_paths,
        vec![
            PathBuf::from("/var/cache/apt/archives/lock"),
            PathBuf::from("/var/lib/apt/lists/lock"),
            PathBuf::from("/var/lib/dpkg/lock"),
            PathBuf::from("/var/lib/dpkg/lock-frontend"),
        ]
    );
    assert_eq!(config.lock_poll_interval(), Duration::from_secs(1));
    assert_eq!(config.lock_max_wait(), None);
    assert_eq!(
        config.environment.get("DEBIAN_FRONTEND").map(String::as_str),
        Some("noninteractive")
    );
    assert_eq!(config.environment.get("LC_ALL").map(String::as_str), Some("C"));
}

#[test]
fn empty_config_file_yields_defaults() {
    let config = UpgradeConfig::parse("").expect("must parse empty config");
    assert_eq!(config, UpgradeConfig::default());
}

#[test]
fn config_overrides_selected_fields() {
    let content = r#"
retries = 5
lock_max_wait_secs = 90
apt_config_dir = "/tmp/apt"
retirement_markers = ["old.mirror.example"]

[environment]
DEBIAN_FRONTEND = "noninteractive"
"#;
    let config = UpgradeConfig::parse(content).expect("must parse config");
    assert_eq!(config.attempts(), 5);
    assert_eq!(config.lock_max_wait(), Some(Duration::from_secs(90)));
    assert_eq!(config.apt_config_dir, PathBuf::from("/tmp/apt"));
    assert_eq!(config.retirement_markers, vec!["old.mirror.example"]);
    assert_eq!(config.environment.len(), 1);
    assert_eq!(config.package_manager, "apt-get");
}

#[test]
fn zero_retries_still_runs_once() {
    let config = UpgradeConfig::parse("retries = 0").expect("must parse config");
    assert_eq!(config.attempts(), 1);
}

#[test]
fn config_rejects_unsupported_version() {
    let err = UpgradeConfig::parse("version = 2").expect_err("must reject version 2");
    assert!(err.to_string().contains("unsupported config version 2"));
}

#[test]
fn config_rejects_unknown_keys() {
    UpgradeConfig::parse("retry = 3").expect_err("must reject misspelled key");
}

#[test]
fn config_rejects_zero_poll_interval_and_blank_markers() {
    UpgradeConfig::parse("lock_poll_interval_ms = 0").expect_err("must reject zero interval");
    UpgradeConfig::parse("retirement_markers = [\"  \"]").expect_err("must reject blank marker");
}

#[test]
fn load_reads_explicit_path_and_requires_it_to_exist() {
    let dir = tempfile::tempdir().expect("must create temp dir");
    let path = dir.path().join("upgrade.toml");
    fs::write(&path, "package_manager = \"/usr/bin/apt\"\n").expect("must write config");

    let config = UpgradeConfig::load(Some(&path)).expect("must load config");
    assert_eq!(config.package_manager, "/usr/bin/apt");

    let missing = dir.path().join("missing.toml");
    let err = UpgradeConfig::load(Some(&missing)).expect_err("missing file must fail");
    assert!(format!("{err:#}").contains("failed to read upgrade config"));
}

#[test]
fn layout_resolves_live_and_template_source_dirs() {
    let layout = SystemLayout::new("/etc/apt", "/usr/share/io.elementary.upgrade");
    assert_eq!(layout.apt_config_dir(), Path::new("/etc/apt"));
    assert_eq!(
        layout.sources_list_dir(),
        PathBuf::from("/etc/apt/sources.list.d")
    );
    assert_eq!(
        layout.release_sources_template_dir("horus"),
        PathBuf::from("/usr/share/io.elementary.upgrade/horus/sources.list.d")
    );
}

#[test]
fn config_layout_uses_configured_dirs() {
    let config = UpgradeConfig {
        apt_config_dir: PathBuf::from("/srv/apt"),
        release_data_dir: PathBuf::from("/srv/data"),
        ..UpgradeConfig::default()
    };
    let layout = config.layout();
    assert_eq!(layout.sources_list_dir(), PathBuf::from("/srv/apt/sources.list.d"));
    assert_eq!(layout.release_data_dir(), Path::new("/srv/data"));
}
