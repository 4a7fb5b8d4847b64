use logbytes::{
    Encoding, Error, FileMode, FileTarget, Formatter, Kind, Level, LogRecord, Registry, Sink,
};
use std::fs;
use tempfile::TempDir;

fn record(msg: &str) -> LogRecord {
    LogRecord::new(Level::INFO, "test", msg)
}

#[test]
fn file_sink_appends_lines() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("app.log");
    fs::write(&path, "existing\n").unwrap();

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::NOTSET, &FileTarget::new(&path))
        .unwrap();
    assert!(sink.is_open());

    sink.emit(&record("one")).unwrap();
    sink.emit(&record("two")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["existing", "one", "two"]);
}

#[test]
fn write_mode_truncates() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("app.log");
    fs::write(&path, "old content\n").unwrap();

    let registry = Registry::new();
    let sink = registry
        .file_sink(
            "file",
            Level::NOTSET,
            &FileTarget::new(&path).mode(FileMode::Write),
        )
        .unwrap();
    sink.emit(&record("fresh")).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
}

#[test]
fn relative_path_resolves_against_base_dir() {
    let tmp_dir = TempDir::new().unwrap();
    let registry = Registry::new();
    let sink = registry
        .file_sink(
            "file",
            Level::NOTSET,
            &FileTarget::new("nested/out.log").base_dir(tmp_dir.path()),
        )
        .unwrap();

    assert!(sink.path().is_absolute());
    assert_eq!(sink.path(), tmp_dir.path().join("nested").join("out.log"));
    sink.emit(&record("x")).unwrap();
    assert!(tmp_dir.path().join("nested").join("out.log").exists());
}

#[test]
fn eager_open_failure_is_construction_error() {
    let tmp_dir = TempDir::new().unwrap();
    // A regular file cannot be a parent directory, even for root.
    let blocker = tmp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("app.log");

    let registry = Registry::new();
    let result = registry.file_sink("file", Level::INFO, &FileTarget::new(&path));

    assert!(matches!(
        result,
        Err(Error::Construction {
            kind: Kind::FileSink,
            ..
        })
    ));
    assert_eq!(registry.count(Kind::FileSink), 0);
    assert_eq!(registry.tracked(Kind::FileSink), 0);
}

#[test]
fn lazy_open_failure_surfaces_on_first_emit() {
    let tmp_dir = TempDir::new().unwrap();
    let blocker = tmp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("app.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::INFO, &FileTarget::new(&path).delay(true))
        .unwrap();
    assert_eq!(registry.count(Kind::FileSink), 1);
    assert!(!sink.is_open());

    let result = sink.emit(&record("first"));
    assert!(matches!(result, Err(Error::Construction { .. })));
    // Still failing, not silently swallowed.
    assert!(sink.emit(&record("second")).is_err());
}

#[test]
fn lazy_open_creates_file_on_first_emit() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("lazy.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::INFO, &FileTarget::new(&path).delay(true))
        .unwrap();
    assert!(!path.exists());

    sink.emit(&record("hello")).unwrap();
    assert!(sink.is_open());
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
}

#[test]
fn filtered_record_does_not_open_lazy_file() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("lazy.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::ERROR, &FileTarget::new(&path).delay(true))
        .unwrap();

    assert!(!sink.emit(&record("quiet")).unwrap());
    assert!(!path.exists());
}

#[test]
fn latin1_encoding() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("latin.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink(
            "file",
            Level::NOTSET,
            &FileTarget::new(&path).encoding(Encoding::Latin1),
        )
        .unwrap();
    assert_eq!(sink.encoding(), Some(Encoding::Latin1));

    sink.emit(&record("café")).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"caf\xe9\n");

    let result = sink.emit(&record("✔ done"));
    assert!(matches!(result, Err(Error::Encoding { ch: '✔', .. })));
}

#[test]
fn binary_mode_has_no_encoding() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("raw.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink(
            "file",
            Level::NOTSET,
            &FileTarget::new(&path)
                .mode(FileMode::Binary)
                .encoding(Encoding::Latin1),
        )
        .unwrap();

    assert_eq!(sink.encoding(), None);
    sink.emit(&record("✔ raw")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "✔ raw\n");
}

#[test]
fn closed_file_sink_rejects_emit() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("closed.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::NOTSET, &FileTarget::new(&path))
        .unwrap();
    sink.emit(&record("before")).unwrap();
    sink.close();

    assert!(!sink.is_open());
    assert!(matches!(
        sink.emit(&record("after")),
        Err(Error::SinkClosed { .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "before\n");
}

#[test]
fn file_sink_uses_formatter() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("fmt.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::NOTSET, &FileTarget::new(&path))
        .unwrap();
    sink.core()
        .set_formatter(Some(Formatter::new("{name}|{level}|{msg}")));

    sink.emit(&record("formatted")).unwrap();
    sink.flush().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "test|INFO|formatted\n");
}

#[test]
fn mode_and_encoding_parse() {
    assert_eq!("a".parse::<FileMode>().unwrap(), FileMode::Append);
    assert_eq!("write".parse::<FileMode>().unwrap(), FileMode::Write);
    assert_eq!("ab".parse::<FileMode>().unwrap(), FileMode::Binary);
    assert!(matches!(
        "x".parse::<FileMode>(),
        Err(Error::InvalidTarget(_))
    ));
    assert_eq!("UTF8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("iso-8859-1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert!(matches!(
        "utf-16".parse::<Encoding>(),
        Err(Error::InvalidTarget(_))
    ));
}

#[test]
fn close_releases_handle_and_keeps_written_lines() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("close.log");

    let registry = Registry::new();
    let sink = registry
        .file_sink("file", Level::NOTSET, &FileTarget::new(&path))
        .unwrap();
    sink.emit(&record("kept")).unwrap();

    sink.close();
    sink.close();

    assert!(sink.is_closed());
    assert!(!sink.is_open());
    assert!(sink.flush().is_ok());
    assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
}
