use crate::config::LoggingConfig;
use crate::log_buffer::{LogBuffer, LogBufferLayer};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: stdout, the `/logs` buffer and an optional
/// rolling file. The returned guard must outlive the server or buffered file
/// output is lost.
pub fn init(config: &LoggingConfig, log_buffer: LogBuffer) -> Option<WorkerGuard> {
    // RUST_LOG overrides the default level
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(LogBufferLayer::new(log_buffer, config.buffer_capacity));

    if !config.enabled {
        subscriber.init();
        return None;
    }

    if let Err(e) = fs::create_dir_all(&config.directory) {
        eprintln!("Failed to create log directory {}: {}", config.directory, e);
    }

    cleanup_old_logs(config);

    let file_appender = match config.rotation.as_str() {
        "hourly" => rolling::hourly(&config.directory, &config.file_prefix),
        "never" => rolling::never(&config.directory, &config.file_prefix),
        _ => rolling::daily(&config.directory, &config.file_prefix),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    subscriber
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}

/// Delete log files beyond `max_files` (newest kept) or older than `max_age_days`.
/// Zero disables the corresponding limit. Returns the number of files removed.
pub fn cleanup_old_logs(config: &LoggingConfig) -> usize {
    if config.max_files == 0 && config.max_age_days == 0 {
        return 0;
    }

    let log_dir = Path::new(&config.directory);
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let name = entry.file_name();
            if !name.to_str()?.starts_with(&config.file_prefix) {
                return None;
            }
            Some((entry.path(), metadata.modified().ok()?))
        })
        .collect();

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let now = SystemTime::now();
    let max_age = Duration::from_secs(u64::from(config.max_age_days) * 24 * 60 * 60);
    let mut deleted = 0;

    for (idx, (path, modified)) in log_files.iter().enumerate() {
        let over_count = config.max_files > 0 && idx >= config.max_files as usize;
        let over_age = config.max_age_days > 0
            && now
                .duration_since(*modified)
                .map(|age| age > max_age)
                .unwrap_or(false);

        if over_count || over_age {
            match fs::remove_file(path) {
                Ok(_) => deleted += 1,
                Err(e) => eprintln!("Failed to delete log file {:?}: {}", path, e),
            }
        }
    }

    if deleted > 0 {
        eprintln!("Cleaned up {} old log file(s)", deleted);
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logging_config(dir: &Path, max_files: u32) -> LoggingConfig {
        LoggingConfig {
            enabled: true,
            directory: dir.to_string_lossy().into_owned(),
            file_prefix: "bridge".to_string(),
            rotation: "daily".to_string(),
            max_files,
            max_age_days: 0,
            buffer_capacity: 10,
        }
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = TempDir::new().unwrap();
        for i in 0..4 {
            fs::write(dir.path().join(format!("bridge.2024-01-0{}", i + 1)), "log").unwrap();
            std::thread::sleep(Duration::from_millis(20));
        }
        fs::write(dir.path().join("other.log"), "keep").unwrap();

        let deleted = cleanup_old_logs(&logging_config(dir.path(), 2));

        assert_eq!(deleted, 2);
        assert!(dir.path().join("bridge.2024-01-04").exists());
        assert!(dir.path().join("bridge.2024-01-03").exists());
        assert!(!dir.path().join("bridge.2024-01-01").exists());
        assert!(dir.path().join("other.log").exists());
    }

    #[test]
    fn test_cleanup_unlimited_is_noop() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bridge.1"), "log").unwrap();

        assert_eq!(cleanup_old_logs(&logging_config(dir.path(), 0)), 0);
        assert!(dir.path().join("bridge.1").exists());
    }

    #[test]
    fn test_cleanup_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert_eq!(cleanup_old_logs(&logging_config(&missing, 1)), 0);
    }
}
