use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::cache::credential_cache::CredentialCache;
use crate::config::provider::{ProviderConfig, ServiceConfig};
use crate::config::settings::ValidationPolicy;
use crate::error::NoticeError;
use crate::helpers::time::{get_instant, get_token_safety_margin_seconds, Clock, SystemClock};
use crate::notice::request::{NoticeRequest, NoticeResponse};
use crate::notice::template::build_template_message;
use crate::observability::metrics::{get_metrics, OUTCOME_REJECTED, OUTCOME_SUCCESS};
use crate::provider::http::HttpWeixinApi;
use crate::provider::WeixinApi;

/// Turns notice requests into template messages.
///
/// Per call: validate, obtain a credential, send, map the reply. A reply
/// saying the token expired gets one forced refresh and one resend; nothing
/// else is retried.
pub struct NoticeDispatcher<A> {
    api: Arc<A>,
    credentials: Arc<CredentialCache<A>>,
    provider: Arc<ProviderConfig>,
    policy: ValidationPolicy,
    clock: Arc<dyn Clock>,
}

impl NoticeDispatcher<HttpWeixinApi> {
    /// Wire the HTTP provider client, credential cache and dispatcher from config.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let provider = Arc::new(config.provider.clone());
        let api = Arc::new(HttpWeixinApi::from_settings(&config.settings.http, &provider.api_base_url)?);
        let credentials = Arc::new(CredentialCache::new(
            api.clone(),
            provider.clone(),
            get_token_safety_margin_seconds(config.settings.safety_margin_seconds),
        ));
        Ok(Self::new(api, credentials, provider, config.settings.validation))
    }
}

impl<A: WeixinApi> NoticeDispatcher<A> {
    pub fn new(
        api: Arc<A>,
        credentials: Arc<CredentialCache<A>>,
        provider: Arc<ProviderConfig>,
        policy: ValidationPolicy,
    ) -> Self {
        Self {
            api,
            credentials,
            provider,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Inbound "send notice" operation; an absent request is an invalid one.
    pub async fn send_notice(&self, request: Option<NoticeRequest>) -> Result<NoticeResponse, NoticeError> {
        match request {
            Some(request) => self.dispatch(&request).await,
            None => {
                let start = get_instant();
                let err = NoticeError::InvalidRequest("notice request is absent".to_string());
                let metrics = get_metrics().await;
                metrics.notice_dispatches.with_label_values(&[err.kind()]).inc();
                metrics
                    .notice_dispatch_duration
                    .with_label_values(&[err.kind()])
                    .observe(start.elapsed().as_secs_f64());
                warn!(error = %err, "notice rejected");
                Err(err)
            }
        }
    }

    pub async fn dispatch(&self, request: &NoticeRequest) -> Result<NoticeResponse, NoticeError> {
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.run(request).await;

        let outcome = match &result {
            Ok(response) if response.success() => OUTCOME_SUCCESS,
            Ok(_) => OUTCOME_REJECTED,
            Err(e) => e.kind(),
        };
        metrics.notice_dispatches.with_label_values(&[outcome]).inc();
        metrics
            .notice_dispatch_duration
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(response) if response.success() => {
                info!(msg_id = ?response.msg_id(), "notice delivered")
            }
            Ok(response) => warn!(
                code = ?response.code(),
                message = ?response.message(),
                "notice rejected by provider"
            ),
            Err(e) => warn!(error = %e, "notice failed"),
        }
        result
    }

    async fn run(&self, request: &NoticeRequest) -> Result<NoticeResponse, NoticeError> {
        let notice = request.validate(self.policy)?;
        info!(
            platform = %notice.platform,
            subject = %notice.subject,
            description_len = notice.description.chars().count(),
            "dispatching notice"
        );

        let credential = self.credentials.get_valid_credential().await?;
        let message = build_template_message(&notice, &self.provider, self.clock.now());

        let reply = self.api.send_template_message(&credential.token, &message).await?;
        if !reply.is_token_expired() {
            return Ok(NoticeResponse::from_reply(reply));
        }

        warn!(errcode = ?reply.errcode, "provider rejected access token, refreshing and resending once");
        get_metrics().await.token_expired_resends.inc();
        let credential = self.credentials.refresh_stale(&credential.token).await?;
        let reply = self.api.send_template_message(&credential.token, &message).await?;
        Ok(NoticeResponse::from_reply(reply))
    }
}
