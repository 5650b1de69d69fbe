use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset. Quiets HTTP client/server internals.
const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,mio=warn,tower_http=info";

/// Initialize the structured logging system.
///
/// Sets up:
/// - File output: rolling log files `{log_dir}/voice-preview.<date>.log`
///   with daily rotation, keeping the latest 5 files.
/// - Console output (stderr): compact human-readable format.
/// - Environment filter: `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
///
/// Fails if the appender cannot be created or a global subscriber is
/// already set.
pub fn init(log_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("voice-preview")
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)?;

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!(
        log_dir = %log_dir.display(),
        "Logger initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
