use std::{fs::File, io::Write, path::Path, sync::Mutex};

use log::{LevelFilter, Log, Metadata, Record};

use osutils::files;

use super::LogEntry;

/// Writes every accepted record to a file as one JSON object per line.
///
/// Failing to open the file leaves the logger disabled rather than aborting
/// the installation.
pub struct BackgroundLog {
    target: Option<Mutex<File>>,
    max_level: LevelFilter,
}

impl BackgroundLog {
    /// Truncates or creates the log file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = path
            .parent()
            .map_or(Ok(()), files::create_dirs)
            .and_then(|_| Ok(File::create(path)?));

        let target = match file {
            Ok(file) => Some(Mutex::new(file)),
            Err(err) => {
                eprintln!(
                    "Logging setup error: failed to create log file '{}': {err:?}",
                    path.display()
                );
                None
            }
        };

        Self {
            target,
            max_level: LevelFilter::Trace,
        }
    }

    pub fn with_max_level(self, max_level: LevelFilter) -> Self {
        Self { max_level, ..self }
    }

    pub fn into_logger(self) -> Box<dyn Log> {
        Box::new(self)
    }

    fn write_entry(&self, record: &Record) -> Result<(), Box<dyn std::error::Error + '_>> {
        let Some(file) = self.target.as_ref() else {
            return Ok(());
        };

        let mut line = serde_json::to_string(&LogEntry::from(record))?;
        line.push('\n');

        let mut file = file.lock()?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl Log for BackgroundLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.target.is_some() && metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        // Best effort
        let _ = self.write_entry(record);
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use std::fs;

    use log::Level;

    use super::*;
    use crate::logging::Level as EntryLevel;

    fn metadata(level: Level) -> Metadata<'static> {
        Metadata::builder().level(level).build()
    }

    #[test]
    fn test_filter() {
        let dir = tempfile::tempdir().unwrap();
        let logger = BackgroundLog::new(dir.path().join("anchor.log"))
            .with_max_level(LevelFilter::Info)
            .into_logger();

        assert!(logger.enabled(&metadata(Level::Info)));
        assert!(!logger.enabled(&metadata(Level::Debug)));
    }

    #[test]
    fn test_disabled_on_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = BackgroundLog::new(dir.path());
        assert!(log.target.is_none());
        assert!(!log.enabled(&metadata(Level::Error)));
    }

    #[test]
    fn test_creates_parents_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/anchor.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "previous run\n").unwrap();

        let logger = BackgroundLog::new(&path).into_logger();
        logger.log(
            &Record::builder()
                .args(format_args!("Installing into target root '/mnt'"))
                .level(Level::Info)
                .build(),
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("previous run"));
        assert!(content.contains("Installing into target root '/mnt'"));

        let nested = dir.path().join("new/dir/anchor.log");
        BackgroundLog::new(&nested);
        assert!(nested.exists());
    }

    #[test]
    fn test_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchor.log");
        let logger = BackgroundLog::new(&path).into_logger();

        for (level, message) in [
            (Level::Info, "Starting stage 'storage'"),
            (Level::Warn, "Password for 'alice' was not set, retrying"),
        ] {
            logger.log(
                &Record::builder()
                    .args(format_args!("{message}"))
                    .level(level)
                    .target("anchor")
                    .module_path(Some("anchor::engine"))
                    .file(Some(file!()))
                    .line(Some(7))
                    .build(),
            );
        }

        let entries = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str::<LogEntry>(line).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, EntryLevel::Info);
        assert_eq!(entries[0].message, "Starting stage 'storage'");
        assert_eq!(entries[1].level, EntryLevel::Warn);
        assert_eq!(entries[1].module, "anchor::engine");
        assert_eq!(entries[1].file, file!());
        assert_eq!(entries[1].line, 7);
    }
}
