use serde::Deserialize;

use crate::config::settings::SettingsConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com";

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub provider: ProviderConfig,
}

/// ================================
/// WeChat official account
/// ================================
/// Static for the lifetime of the process.
#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    /// invariant: starts with `wx`
    pub app_id: String,
    /// invariant: exactly 32 characters
    pub app_secret: String,
    pub template_id: String,
    /// openid of the recipient
    pub to_user: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

// app_secret stays out of logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .field("template_id", &self.template_id)
            .field("to_user", &self.to_user)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}
