use logbytes::config::{LEVEL_ENV, LOG_DIR_ENV};
use logbytes::{Config, Encoding, Error, FileMode, Kind, Level, Registry};
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults_are_usable() {
    let config = Config::default();
    assert_eq!(config.level().unwrap(), Level::INFO);
    assert_eq!(config.stderr_level().unwrap(), Level::INFO);
    assert_eq!(config.file_level().unwrap(), Level::NOTSET);
    assert!(config.stderr.enabled);
    assert!(!config.file.enabled);
}

#[test]
fn parse_accepts_names_and_ordinals() {
    let config = Config::parse(
        r#"
[general]
level = "warn"

[stderr]
level = 40

[file]
enabled = true
level = "debug"
"#,
    )
    .unwrap();

    assert_eq!(config.level().unwrap(), Level::WARNING);
    assert_eq!(config.stderr_level().unwrap(), Level::ERROR);
    assert_eq!(config.file_level().unwrap(), Level::DEBUG);
}

#[test]
fn wrong_level_type_is_invalid_level() {
    let config = Config::parse("[general]\nlevel = 2.5\n").unwrap();
    assert!(matches!(config.level(), Err(Error::InvalidLevel(_))));

    let config = Config::parse("[general]\nlevel = \"LOUD\"\n").unwrap();
    assert!(matches!(config.level(), Err(Error::InvalidLevel(_))));
}

#[test]
fn syntax_error_is_config_parse() {
    assert!(matches!(
        Config::parse("[general"),
        Err(Error::ConfigParse(_))
    ));
}

#[test]
fn env_overrides_level_and_dir() {
    let mut config = Config::default();
    config.apply_env(|key| match key {
        LEVEL_ENV => Some("10".to_string()),
        LOG_DIR_ENV => Some("/tmp/logbytes-env".to_string()),
        _ => None,
    });
    assert_eq!(config.level().unwrap(), Level::DEBUG);
    assert_eq!(config.log_dir(), std::path::PathBuf::from("/tmp/logbytes-env"));

    config.apply_env(|key| (key == LEVEL_ENV).then(|| "critical".to_string()));
    assert_eq!(config.level().unwrap(), Level::CRITICAL);
}

#[test]
fn load_from_missing_file_yields_defaults() {
    let tmp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&tmp_dir.path().join("missing.toml")).unwrap();
    assert_eq!(config.level().unwrap(), Level::INFO);
}

#[test]
fn load_from_reads_file() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("config.toml");
    fs::write(&path, "[general]\nlevel = \"ERROR\"\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.level().unwrap(), Level::ERROR);
}

#[test]
fn file_target_reflects_file_section() {
    let tmp_dir = TempDir::new().unwrap();
    let mut config = Config::parse(
        r#"
[file]
enabled = true
filename = "out.log"
mode = "w"
encoding = "latin-1"
delay = true
"#,
    )
    .unwrap();
    config.general.log_dir = tmp_dir.path().display().to_string();

    let registry = Registry::new();
    let sink = registry
        .file_sink("cfg", Level::NOTSET, &config.file_target().unwrap())
        .unwrap();
    assert_eq!(sink.path(), tmp_dir.path().join("out.log"));
    assert_eq!(sink.mode(), FileMode::Write);
    assert_eq!(sink.encoding(), Some(Encoding::Latin1));
    assert!(sink.is_delayed());
    assert!(!sink.is_open());
}

#[test]
fn unknown_file_mode_is_rejected() {
    let config = Config::parse("[file]\nmode = \"rw+\"\n").unwrap();
    assert!(matches!(
        config.file_target(),
        Err(Error::InvalidTarget(_))
    ));
}

#[test]
fn logger_from_config_attaches_enabled_sinks() {
    let tmp_dir = TempDir::new().unwrap();
    let mut config = Config::parse(
        r#"
[general]
level = "DEBUG"

[stderr]
enabled = false

[file]
enabled = true
filename = "app.log"
"#,
    )
    .unwrap();
    config.general.log_dir = tmp_dir.path().display().to_string();

    let registry = Registry::new();
    let logger = registry.logger_from_config("app", &config).unwrap();
    assert_eq!(logger.level(), Level::DEBUG);
    assert_eq!(logger.sinks().len(), 1);
    assert_eq!(logger.sinks()[0].kind, Kind::FileSink);

    logger.debug("configured").unwrap();
    logger.flush().unwrap();
    assert_eq!(
        fs::read_to_string(tmp_dir.path().join("app.log")).unwrap(),
        "configured\n"
    );

    // Repeated wiring reuses the same logger and sink.
    let again = registry.logger_from_config("app", &config).unwrap();
    assert!(again.same_instance(&logger));
    assert_eq!(again.sinks().len(), 1);
    assert_eq!(registry.count(Kind::FileSink), 1);
}
