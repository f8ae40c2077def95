//! Log subscriber setup

use anyhow::{anyhow, Context, Result};
use pact_core::{EVENTS_TARGET, KEYS_TARGET};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directives for `settings`, with `level` taking precedence over the
/// configured level
pub fn directives(settings: &LoggingConfig, level: Option<&str>) -> String {
    let level = level.unwrap_or(settings.level.as_str());
    let mut directives = vec![level.to_string()];
    if !settings.events {
        directives.push(format!("{EVENTS_TARGET}=off"));
    }
    match (settings.keys, settings.events) {
        (false, _) => directives.push(format!("{KEYS_TARGET}=off")),
        // The keys target sits under the events target
        (true, false) => directives.push(format!("{KEYS_TARGET}={level}")),
        (true, true) => {}
    }
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` replaces the computed filter
/// when set.
pub fn init(settings: &LoggingConfig, level: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = directives(settings, level);
            EnvFilter::try_new(&directives)
                .with_context(|| format!("Invalid log filter: {directives}"))?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_silence_events() {
        let directives = directives(&LoggingConfig::default(), None);
        assert_eq!(
            directives,
            "info,pact_core::events=off,pact_core::events::keys=off"
        );
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_enabled_targets() {
        let settings = LoggingConfig {
            level: "warn".to_string(),
            events: true,
            keys: true,
        };
        assert_eq!(directives(&settings, None), "warn");
        assert_eq!(directives(&settings, Some("trace")), "trace");
    }

    #[test]
    fn test_keys_without_events() {
        let settings = LoggingConfig {
            keys: true,
            ..LoggingConfig::default()
        };
        assert_eq!(
            directives(&settings, Some("trace")),
            "trace,pact_core::events=off,pact_core::events::keys=trace"
        );
    }

    #[test]
    fn test_keys_silenced_independently() {
        let settings = LoggingConfig {
            events: true,
            ..LoggingConfig::default()
        };
        assert_eq!(
            directives(&settings, None),
            "info,pact_core::events::keys=off"
        );
    }
}
