use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const DEFAULT_LOG_FILTER: &str = "warn,gema=info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw.unwrap_or("").trim().to_ascii_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn file_writer(path: &Path) -> std::io::Result<BoxMakeWriter> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("gema.log"));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Ok(BoxMakeWriter::new(writer))
}

/// Best-effort tracing init. Logs go to stderr, or to a rolling daily
/// file when LOG_FILE is set, so conversation output on stdout stays
/// clean. Never fatal.
pub fn init() {
    let format = parse_log_format(env::var("LOG_FORMAT").ok().as_deref());
    let log_file = env::var("LOG_FILE")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    let writer = match log_file {
        Some(path) => match file_writer(&path) {
            Ok(writer) => writer,
            Err(err) => {
                eprintln!(
                    "gema: failed to open log file '{}': {}; logging to stderr",
                    path.display(),
                    err
                );
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let init_result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
    };
    let _ = init_result;
}
