//! The `config` command: inspect and modify the configuration file.

use crate::cli::{ConfigAction, ConfigArgs, ui};
use crate::config::{Config, ConfigService};
use crate::{Result, error::VocalisError};
use std::sync::Arc;

/// Execute the config command with an injected configuration service.
pub async fn execute_with_config(
    args: ConfigArgs,
    config_service: Arc<dyn ConfigService>,
) -> Result<()> {
    match args.action {
        ConfigAction::Get { key } => {
            let config = config_service.get_config()?;
            println!("{}", get_value(&config, &key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let mut config = config_service.get_config()?;
            set_value(&mut config, &key, &value)?;
            config_service.save_config(&config)?;
            ui::print_success(&format!("Set {} = {}", key, value));
            Ok(())
        }
        ConfigAction::List => {
            let config = config_service.get_config()?;
            let rendered = toml::to_string_pretty(&config).map_err(|e| {
                VocalisError::config(format!("Failed to render configuration: {}", e))
            })?;
            println!("{}", rendered);
            Ok(())
        }
        ConfigAction::Reset => {
            config_service.save_config(&Config::default())?;
            ui::print_success("Configuration reset to defaults");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_service.get_config_file_path()?.display());
            Ok(())
        }
    }
}

/// Read one configuration value by dot-separated key.
pub fn get_value(config: &Config, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();
    let value = match parts.as_slice() {
        ["general", "worker_count"] => config.general.worker_count.to_string(),
        ["general", "analyzer_timeout_ms"] => config.general.analyzer_timeout_ms.to_string(),
        ["general", "max_concurrent_requests"] => {
            config.general.max_concurrent_requests.to_string()
        }
        ["transcriber", "provider"] => config.transcriber.provider.clone(),
        ["transcriber", "api_key"] => config
            .transcriber
            .api_key
            .as_deref()
            .map(|_| "<set>".to_string())
            .unwrap_or_else(|| "<unset>".to_string()),
        ["transcriber", "model"] => config.transcriber.model.clone(),
        ["transcriber", "base_url"] => config.transcriber.base_url.clone(),
        ["transcriber", "language"] => config.transcriber.language.clone(),
        ["transcriber", "timeout_seconds"] => config.transcriber.timeout_seconds.to_string(),
        ["transcriber", "max_retries"] => config.transcriber.max_retries.to_string(),
        ["analysis", "min_confidence"] => config.analysis.min_confidence.to_string(),
        ["analysis", "gender_hint_default"] => config.analysis.gender_hint_default.clone(),
        ["analysis", "gender_tie_break"] => config.analysis.gender_tie_break.to_string(),
        ["analysis", "reference_data_dir"] => config
            .analysis
            .reference_data_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<default>".to_string()),
        ["analysis", "weights", id] => config
            .analysis
            .weights
            .get(*id)
            .map(|w| w.to_string())
            .ok_or_else(|| VocalisError::config(format!("unknown analyzer id '{}'", id)))?,
        _ => {
            return Err(VocalisError::config(format!(
                "unknown configuration key '{}'",
                key
            )));
        }
    };
    Ok(value)
}

/// Set one configuration value by dot-separated key. The full
/// configuration is re-validated before the caller persists it.
pub fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["general", "worker_count"] => {
            config.general.worker_count = parse(key, value)?;
        }
        ["general", "analyzer_timeout_ms"] => {
            config.general.analyzer_timeout_ms = parse(key, value)?;
        }
        ["general", "max_concurrent_requests"] => {
            config.general.max_concurrent_requests = parse(key, value)?;
        }
        ["transcriber", "provider"] => {
            config.transcriber.provider = value.to_string();
        }
        ["transcriber", "api_key"] => {
            config.transcriber.api_key = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
        ["transcriber", "model"] => {
            config.transcriber.model = value.to_string();
        }
        ["transcriber", "base_url"] => {
            config.transcriber.base_url = value.to_string();
        }
        ["transcriber", "language"] => {
            config.transcriber.language = value.to_string();
        }
        ["transcriber", "temperature"] => {
            config.transcriber.temperature = parse(key, value)?;
        }
        ["transcriber", "timeout_seconds"] => {
            config.transcriber.timeout_seconds = parse(key, value)?;
        }
        ["transcriber", "max_retries"] => {
            config.transcriber.max_retries = parse(key, value)?;
        }
        ["transcriber", "retry_delay_ms"] => {
            config.transcriber.retry_delay_ms = parse(key, value)?;
        }
        ["analysis", "min_confidence"] => {
            config.analysis.min_confidence = parse(key, value)?;
        }
        ["analysis", "gender_hint_default"] => {
            config.analysis.gender_hint_default = value.to_string();
        }
        ["analysis", "gender_tie_break"] => {
            config.analysis.gender_tie_break = parse(key, value)?;
        }
        ["analysis", "reference_data_dir"] => {
            config.analysis.reference_data_dir = Some(value.into());
        }
        ["analysis", "weights", id] => {
            let weight: f32 = parse(key, value)?;
            config.analysis.weights.insert(id.to_string(), weight);
        }
        _ => {
            return Err(VocalisError::config(format!(
                "unknown configuration key '{}'",
                key
            )));
        }
    }
    crate::config::validator::validate_config(config)
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VocalisError::config(format!("invalid value '{}' for {}", value, key)))
}
