use serde::{Deserialize, Serialize};

pub(super) mod background_log;
pub(super) mod multilog;

/// Key-value attached to records emitted on behalf of an install stage.
pub(crate) const STAGE_KEY: &str = "stage";

/// One line of the background log.
#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    pub level: Level,
    pub message: String,
    /// Install stage the record belongs to, when it was tagged with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub target: String,
    pub module: String,
    pub file: String,
    pub line: u32,
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Level {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl From<log::Level> for Level {
    fn from(value: log::Level) -> Self {
        match value {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}

impl From<&log::Record<'_>> for LogEntry {
    fn from(value: &log::Record) -> Self {
        Self {
            level: value.level().into(),
            message: value.args().to_string(),
            stage: value
                .key_values()
                .get(log::kv::Key::from_str(STAGE_KEY))
                .map(|stage| stage.to_string()),
            target: value.target().to_string(),
            module: value.module_path().unwrap_or_default().to_string(),
            file: value.file().unwrap_or_default().to_string(),
            line: value.line().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry() {
        let entry = LogEntry::from(
            &log::Record::builder()
                .args(format_args!("Starting stage 'mount'"))
                .level(log::Level::Info)
                .target("anchor::engine")
                .module_path(Some("anchor::engine"))
                .file(Some("src/engine/mod.rs"))
                .line(Some(12))
                .build(),
        );

        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.message, "Starting stage 'mount'");
        assert_eq!(entry.target, "anchor::engine");
        assert_eq!(entry.module, "anchor::engine");
        assert_eq!(entry.file, "src/engine/mod.rs");
        assert_eq!(entry.line, 12);
        assert_eq!(entry.stage, None);
        assert!(!serde_json::to_string(&entry).unwrap().contains("stage"));

        let kvs = [(STAGE_KEY, "mount")];
        let entry = LogEntry::from(
            &log::Record::builder()
                .args(format_args!("Finished stage 'mount'"))
                .level(log::Level::Debug)
                .key_values(&kvs)
                .build(),
        );
        assert_eq!(entry.stage.as_deref(), Some("mount"));
        assert_eq!(
            serde_json::to_value(&entry).unwrap()["stage"],
            serde_json::Value::String("mount".into())
        );

        assert_eq!(
            serde_json::to_value(Level::Warn).unwrap(),
            serde_json::Value::String("warn".into())
        );
    }
}
