//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Provider credentials shape (app id prefix, secret length)
//! - Server / metrics / logging / http invariants

use tracing::{error, info};

use crate::config::provider::{ProviderConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

pub const APP_ID_PREFIX: &str = "wx";
pub const APP_SECRET_LEN: usize = 32;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_provider(&cfg.provider, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// PROVIDER VALIDATION
pub fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    if provider.app_id.trim().is_empty() {
        errors.push("provider.app_id must not be empty".to_string());
    } else if !provider.app_id.starts_with(APP_ID_PREFIX) {
        errors.push(format!(
            "provider.app_id '{}' must start with '{}'",
            provider.app_id, APP_ID_PREFIX
        ));
    }

    // length only, the value itself is never echoed
    let secret_len = provider.app_secret.chars().count();
    if secret_len != APP_SECRET_LEN {
        errors.push(format!(
            "provider.app_secret must be {} characters, got {}",
            APP_SECRET_LEN, secret_len
        ));
    }

    if provider.template_id.trim().is_empty() {
        errors.push("provider.template_id must not be empty".to_string());
    }
    if provider.to_user.trim().is_empty() {
        errors.push("provider.to_user must not be empty".to_string());
    }

    if !(provider.api_base_url.starts_with("http://") || provider.api_base_url.starts_with("https://")) {
        errors.push(format!(
            "provider.api_base_url '{}' must be an http(s) url",
            provider.api_base_url
        ));
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    // safety margin sane bounds, a token lives two hours
    if let Some(s) = settings.safety_margin_seconds {
        if s >= 60 * 60 * 2 {
            errors.push(format!(
                "settings.safety_margin_seconds ({}) must be below the token lifetime (7200)",
                s
            ));
        }
    }

    if settings.http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }

    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
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

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}
