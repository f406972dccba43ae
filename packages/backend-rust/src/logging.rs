use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the background file writer alive; drop flushes pending lines.
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

#[derive(Debug, Clone)]
pub struct FileLogSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl FileLogSettings {
    /// `ENABLE_FILE_LOGS=true|1` turns on daily rolling files under `LOG_DIR`.
    pub fn from_env() -> Option<Self> {
        let enabled = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        if !enabled {
            return None;
        }
        let dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
        Some(Self {
            dir: PathBuf::from(dir),
            file_prefix: "lexi.log".to_string(),
        })
    }
}

pub fn init_tracing(log_level: &str, file: Option<FileLogSettings>) -> Option<FileLogGuard> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let Some(settings) = file else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    };

    if let Err(err) = std::fs::create_dir_all(&settings.dir) {
        eprintln!("failed to create log directory {}: {err}", settings.dir.display());
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &settings.dir, &settings.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Some(FileLogGuard { _guard: guard })
}
