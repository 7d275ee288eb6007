//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - server host/port, metrics path, logging level
//! - upstream URLs, timeouts and token safety margin

use crate::config::settings::SettingsConfig;
use crate::config::sources::{SentinelHubConfig, ServiceConfig};

/// upper bound for the token safety margin; Sentinel Hub tokens live one hour
const MAX_SAFETY_MARGIN_SECONDS: u64 = 60 * 60;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_sentinelhub(&cfg.sentinelhub, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

/// UPSTREAM VALIDATION
fn validate_sentinelhub(cfg: &SentinelHubConfig, errors: &mut Vec<String>) {
    for (path, url) in [("sentinelhub.base_url", &cfg.base_url), ("sentinelhub.oauth_url", &cfg.oauth_url)] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{} '{}' must be an http(s) URL", path, url));
        }
    }
    if cfg.safety_margin_seconds >= MAX_SAFETY_MARGIN_SECONDS {
        errors.push(format!(
            "sentinelhub.safety_margin_seconds ({}) must be < {}",
            cfg.safety_margin_seconds, MAX_SAFETY_MARGIN_SECONDS
        ));
    }
    if cfg.token_timeout_ms == 0 {
        errors.push("sentinelhub.token_timeout_ms must be > 0".to_string());
    }
    if cfg.api_timeout_ms == 0 {
        errors.push("sentinelhub.api_timeout_ms must be > 0".to_string());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_service_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn aggregates_all_issues() {
        let mut cfg = ServiceConfig::default();
        cfg.settings.server.port = "http".into();
        cfg.settings.metrics.path = "metrics".into();
        cfg.sentinelhub.oauth_url = "ftp://example".into();
        cfg.sentinelhub.safety_margin_seconds = 3600;
        cfg.sentinelhub.token_timeout_ms = 0;

        let errors = validate_service_config(&cfg).err().unwrap_or_default();
        assert_eq!(errors.len(), 5, "{errors:?}");
    }
}
