//! Tracing subscriber setup for the command line tool

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter for a verbosity offset: `-q` lowers it, each `-v` raises it
pub fn default_level(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// Human-readable output goes to stderr. With `log_file`, every event is also
/// written there as JSON lines; keep the returned guard alive until exit so
/// buffered lines are flushed. `RUST_LOG` overrides `verbosity`.
pub fn init_logging(verbosity: i8, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let level = default_level(verbosity);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, "warn")]
    #[case(0, "info")]
    #[case(1, "debug")]
    #[case(2, "trace")]
    #[case(5, "trace")]
    fn verbosity_maps_to_level(#[case] verbosity: i8, #[case] expected: &str) {
        assert_eq!(default_level(verbosity), expected);
    }
}
