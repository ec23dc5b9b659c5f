//! Log output setup.
//!
//! Nothing is installed globally. [`dispatch`] builds a subscriber that the
//! caller attaches to the command future with
//! [`WithSubscriber`](tracing::instrument::WithSubscriber).

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Environment variable that overrides the configured level.
pub const LOG_ENV: &str = "RUST_LOG";

/// Build the filter for `level`, unless `RUST_LOG` holds a valid filter.
pub fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()))
}

/// Build a subscriber writing to stderr at the given level.
pub fn dispatch(level: LogLevel) -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}
