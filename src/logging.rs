//! Logging setup
//!
//! Libraries normally leave subscriber installation to the application; this
//! helper exists for services that want the same filter and formats the
//! configuration describes.

use crate::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber for `config`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = LogConfig {
            level: "not a [valid filter".to_string(),
            format: "pretty".to_string(),
        };
        init(&config);
        assert!(!init(&config));
    }
}
