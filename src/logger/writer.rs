//! Log file opening

use std::fs::{File, OpenOptions};
use std::sync::Mutex;

use super::config::FileConfig;
use super::error::LoggerError;

/// Opens the configured log file, creating parent directories as needed.
///
/// The returned `Mutex<File>` is a `MakeWriter` for `tracing_subscriber`, so
/// concurrent events are written whole.
pub(crate) fn open_log_file(config: &FileConfig) -> Result<Mutex<File>, LoggerError> {
    if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.path)?;

    Ok(Mutex::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogFormat;
    use std::io::Write;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path: dir.path().join("nested/dir/app.log"),
            append,
            format: LogFormat::Compact,
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);

        open_log_file(&config).unwrap();

        assert!(config.path.exists());
    }

    #[test]
    fn test_append_keeps_and_truncate_clears() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, true);

        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "first").unwrap();
        writeln!(open_log_file(&config).unwrap().lock().unwrap(), "second").unwrap();
        let content = std::fs::read_to_string(&config.path).unwrap();
        assert!(content.contains("first") && content.contains("second"));

        let truncating = file_config(&dir, false);
        writeln!(open_log_file(&truncating).unwrap().lock().unwrap(), "third").unwrap();
        let content = std::fs::read_to_string(&config.path).unwrap();
        assert_eq!(content, "third\n");
    }
}
