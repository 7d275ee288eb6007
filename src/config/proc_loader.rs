use std::path::Path;
use crate::config::proc_validator;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::sources::{Credentials, ServiceConfig};
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded)
}

pub fn parse_config(content: String) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    fill_credentials_from_env(&mut service_config.sentinelhub.credentials);

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| anyhow!(errors.join("; ")))?;

    Ok(service_config)
}

/// Credentials omitted from the file fall back to the process environment.
fn fill_credentials_from_env(credentials: &mut Credentials) {
    let from_env = Credentials::from_env();
    if credentials.client_id.as_deref().is_none_or(str::is_empty) {
        credentials.client_id = from_env.client_id;
    }
    if credentials.client_secret.as_deref().is_none_or(str::is_empty) {
        credentials.client_secret = from_env.client_secret;
    }
}

/// Replaces `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn expands_env_with_defaults() -> Result<()> {
        std::env::set_var("SH_TEST_PORT", "9001");
        std::env::remove_var("SH_TEST_MISSING");
        let out = expand_env_vars("a: ${SH_TEST_PORT}\nb: ${SH_TEST_MISSING:fallback}\nc: ${SH_TEST_MISSING}")?;
        assert_eq!(out, "a: 9001\nb: fallback\nc: ");
        std::env::remove_var("SH_TEST_PORT");
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn loads_yaml_file_with_defaults() -> Result<()> {
        std::env::set_var("SH_TEST_CLIENT_ID", "file-client");
        std::env::remove_var("SENTINELHUB_CLIENT_SECRET");
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"
settings:
  server:
    port: "${{SH_TEST_SERVER_PORT:8123}}"
  metrics:
    is_enabled: true
sentinelhub:
  oauth_url: http://127.0.0.1:1/oauth/token
  credentials:
    client_id: ${{SH_TEST_CLIENT_ID}}
  safety_margin_seconds: 30
"#
        )?;

        let config = file_to_config(file.path()).await?;
        assert_eq!(config.settings.server.port, "8123");
        assert_eq!(config.settings.server.host, "0.0.0.0");
        assert!(config.settings.metrics.is_enabled);
        assert_eq!(config.settings.metrics.path, "/metrics");
        assert_eq!(config.settings.logging.as_ref().map(|l| l.level.as_str()), Some("info"));
        assert_eq!(config.sentinelhub.oauth_url, "http://127.0.0.1:1/oauth/token");
        assert_eq!(config.sentinelhub.base_url, crate::utils::constants::SENTINELHUB_BASE_URL);
        assert_eq!(config.sentinelhub.credentials.client_id.as_deref(), Some("file-client"));
        assert!(!config.sentinelhub.credentials.is_configured());
        assert_eq!(config.sentinelhub.safety_margin_seconds, 30);

        std::env::remove_var("SH_TEST_CLIENT_ID");
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() {
        let err = parse_config(
            r#"
settings:
  logging:
    level: loud
    format: json
sentinelhub:
  base_url: ""
  api_timeout_ms: 0
"#
            .to_owned(),
        )
        .err()
        .map(|e| e.to_string())
        .unwrap_or_default();

        assert!(err.contains("settings.logging.level"), "{err}");
        assert!(err.contains("sentinelhub.base_url"), "{err}");
        assert!(err.contains("sentinelhub.api_timeout_ms"), "{err}");
    }
}
