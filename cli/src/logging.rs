use std::path::Path;

use anyhow::{anyhow, Result};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

const LOG_PREFIX: &str = "habitism";
const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber: a daily file under `<data_dir>/logs`, plus
/// stderr when `show_std` is set. The TUI passes `false` since it owns the
/// terminal.
pub fn enable_logging(data_dir: &Path, log_level: Option<&str>, show_std: bool) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(data_dir.join("logs"))?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);

    let env = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty());

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(log_level, env.as_deref()))
        .with_ansi(false)
        .with_writer(stderr.and(appender))
        .compact()
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}

/// `--log-level` applies to this workspace's crates only; otherwise a valid
/// `RUST_LOG` is taken as the whole filter.
fn build_filter(log_level: Option<&str>, env: Option<&str>) -> EnvFilter {
    let crate_filter = |level: &str| EnvFilter::new(format!("habitism_core={level},habitism_cli={level}"));

    match (log_level, env) {
        (Some(level), _) => crate_filter(level),
        (None, Some(directives)) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("Ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e);
            crate_filter(DEFAULT_LEVEL)
        }),
        (None, None) => crate_filter(DEFAULT_LEVEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_targets_workspace_crates() {
        let filter = build_filter(Some("debug"), Some("warn")).to_string();
        assert!(filter.contains("habitism_core=debug"));
        assert!(filter.contains("habitism_cli=debug"));
        assert!(!filter.contains("warn"));
    }

    #[test]
    fn test_rust_log_is_used_verbatim() {
        let filter = build_filter(None, Some("habitism_core=trace,hyper=off")).to_string();
        assert!(filter.contains("habitism_core=trace"));
        assert!(filter.contains("hyper=off"));
        assert!(!filter.contains("habitism_cli"));
    }

    #[test]
    fn test_default_and_invalid_rust_log_fall_back_to_info() {
        for env in [None, Some("habitism_core=loud")] {
            let filter = build_filter(None, env).to_string();
            assert!(filter.contains("habitism_core=info"));
            assert!(filter.contains("habitism_cli=info"));
        }
    }
}
