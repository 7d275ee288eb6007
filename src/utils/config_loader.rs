use std::path::Path;
use anyhow::{anyhow, Result};
use tracing::info;

use crate::ServiceConfig;
use crate::config::proc_loader::file_to_config;

/// Loads the YAML config when a path is given, otherwise builds defaults from the environment.
pub async fn run(config_path: Option<&str>) -> Result<ServiceConfig> {
    match config_path {
        Some(config_path) => {
            let path = Path::new(config_path);
            file_to_config(path).await.map_err(|e| anyhow!(format!("Invalid config format: {}", e)))
        }
        None => {
            info!("no config file given, using defaults and environment");
            Ok(ServiceConfig::from_env())
        }
    }
}
