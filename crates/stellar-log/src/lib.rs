//! Structured logging for the stellar renderer.
//!
//! Console output with uptime timestamps and module paths via the
//! `tracing` ecosystem, plus JSON file logging in debug builds for
//! post-mortem analysis of per-frame diagnostics. `log` macro records
//! from the rendering crates are bridged into the same subscriber.

use std::path::Path;

use stellar_config::Settings;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// The filter comes from `RUST_LOG` when set, then from the settings'
/// `debug.log_level`, then falls back to `info`. When `debug_build` is
/// true and `log_dir` is given, frames are also logged as JSON to
/// `stellar.log` in that directory.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, settings: Option<&Settings>) {
    let filter_str = match settings {
        Some(settings) if !settings.debug.log_level.is_empty() => {
            settings.debug.log_level.clone()
        }
        _ => "info".to_string(),
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("stellar.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The default `EnvFilter` used when neither `RUST_LOG` nor the settings
/// specify a level.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_level() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_per_crate_filter_parses() {
        let valid_filters = [
            "info",
            "debug,stellar_render=trace",
            "warn,stellar_orbit=debug",
            "error",
        ];
        for filter_str in &valid_filters {
            assert!(
                EnvFilter::try_from(*filter_str).is_ok(),
                "failed to parse filter: {filter_str}"
            );
        }
    }

    #[test]
    fn test_settings_level_feeds_filter() {
        let mut settings = Settings::default();
        settings.debug.log_level = "trace".to_string();
        let filter = EnvFilter::new(&settings.debug.log_level);
        assert!(format!("{filter}").contains("trace"));
    }
}
