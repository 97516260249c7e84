use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tracing::debug;

use crate::config::settings::HttpClientConfig;
use crate::error::NoticeError;
use crate::provider::types::{AccessTokenReply, SendReply, TemplateMessage};
use crate::provider::WeixinApi;

static TOKEN_PATH: &str = "/cgi-bin/token";
static TEMPLATE_SEND_PATH: &str = "/cgi-bin/message/template/send";

/// reqwest-backed provider client.
#[derive(Debug, Clone)]
pub struct HttpWeixinApi {
    client: Client,
    base_url: String,
}

impl HttpWeixinApi {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Build with a client whose every request is bounded by `timeout_ms`.
    pub fn from_settings(http: &HttpClientConfig, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(http.timeout_ms))
            .build()?;
        Ok(Self::new(client, base_url))
    }
}

impl WeixinApi for HttpWeixinApi {
    async fn fetch_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> Result<AccessTokenReply, NoticeError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        debug!(app_id = %app_id, "requesting access token");

        // the query carries the secret, so errors are reported without their url
        let response = self
            .client
            .get(&url)
            .query(&[
                ("grant_type", "client_credential"),
                ("appid", app_id),
                ("secret", app_secret),
            ])
            .send()
            .await
            .map_err(|e| NoticeError::CredentialFetch(format!("token request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NoticeError::CredentialFetch(format!("token request returned HTTP {}", status)));
        }

        response
            .json::<AccessTokenReply>()
            .await
            .map_err(|e| NoticeError::CredentialFetch(format!("malformed token reply: {}", e.without_url())))
    }

    async fn send_template_message(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> Result<SendReply, NoticeError> {
        let url = format!("{}{}", self.base_url, TEMPLATE_SEND_PATH);
        debug!(touser = %message.touser, template_id = %message.template_id, "sending template message");

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", access_token)])
            .json(message)
            .send()
            .await
            .map_err(|e| NoticeError::Dispatch(format!("template message request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NoticeError::Dispatch(format!("template message returned HTTP {}", status)));
        }

        response
            .json::<SendReply>()
            .await
            .map_err(|e| NoticeError::Dispatch(format!("malformed template message reply: {}", e.without_url())))
    }
}
