use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::credential::Credential;
use crate::config::provider::ProviderConfig;
use crate::error::NoticeError;
use crate::helpers::time::{get_instant, Clock, SystemClock};
use crate::observability::metrics::{get_metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};
use crate::provider::types::{AccessTokenReply, ERRCODE_OK};
use crate::provider::WeixinApi;

static ERRCODE_MSG: &str = "errcode";
static MALFORMED_MSG: &str = "malformed";
static TRANSPORT_MSG: &str = "transport";

/// Single-slot access token cache.
///
/// The lock is held across the exchange call, so concurrent misses wait for
/// the one in-flight refresh instead of issuing their own.
pub struct CredentialCache<A> {
    api: Arc<A>,
    provider: Arc<ProviderConfig>,
    clock: Arc<dyn Clock>,
    safety_margin: Duration,
    cached: Mutex<Option<Credential>>,
}

impl<A: WeixinApi> CredentialCache<A> {
    pub fn new(api: Arc<A>, provider: Arc<ProviderConfig>, safety_margin_seconds: u64) -> Self {
        let safety_margin = i64::try_from(safety_margin_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(Duration::zero);
        Self {
            api,
            provider,
            clock: Arc::new(SystemClock),
            safety_margin,
            cached: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached credential if still fresh, otherwise a newly exchanged one.
    pub async fn get_valid_credential(&self) -> Result<Credential, NoticeError> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(credential) = cached.as_ref().filter(|c| !c.is_stale_at(now, self.safety_margin)) {
            debug!(expires_at = %credential.expires_at, "access token served from cache");
            return Ok(credential.clone());
        }

        let fresh = self.exchange().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Force a refresh after the provider rejected `stale_token`.
    ///
    /// If another caller already replaced that token, the replacement is
    /// returned without a second exchange.
    pub async fn refresh_stale(&self, stale_token: &str) -> Result<Credential, NoticeError> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(credential) = cached
            .as_ref()
            .filter(|c| c.token != stale_token && !c.is_stale_at(now, self.safety_margin))
        {
            debug!("access token already refreshed by a concurrent caller");
            return Ok(credential.clone());
        }

        *cached = None;
        let fresh = self.exchange().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the cached credential; the next caller exchanges a new one.
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }

    async fn exchange(&self) -> Result<Credential, NoticeError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.credential_fetch_requests.inc();

        let result = match self
            .api
            .fetch_access_token(&self.provider.app_id, &self.provider.app_secret)
            .await
        {
            Ok(reply) => self.credential_from_reply(reply).map_err(|(reason, e)| {
                metrics.credential_fetch_failures.with_label_values(&[reason]).inc();
                e
            }),
            Err(e) => {
                metrics.credential_fetch_failures.with_label_values(&[TRANSPORT_MSG]).inc();
                Err(e)
            }
        };

        let outcome = if result.is_ok() { OUTCOME_SUCCESS } else { OUTCOME_FAILURE };
        metrics
            .credential_fetch_duration
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(credential) => {
                metrics.credential_expiry_unix.set(credential.expires_at.timestamp());
                info!(app_id = %self.provider.app_id, expires_at = %credential.expires_at, "access token refreshed");
            }
            Err(e) => warn!(app_id = %self.provider.app_id, error = %e, "access token refresh failed"),
        }
        result
    }

    /// Turn the exchange reply into a credential; errors carry their metrics label.
    fn credential_from_reply(&self, reply: AccessTokenReply) -> Result<Credential, (&'static str, NoticeError)> {
        if let Some(code) = reply.errcode.filter(|code| *code != ERRCODE_OK) {
            return Err((
                ERRCODE_MSG,
                NoticeError::CredentialFetch(format!(
                    "provider rejected token exchange, errcode {}: {}",
                    code,
                    reply.errmsg.unwrap_or_default()
                )),
            ));
        }

        let token = reply.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            (MALFORMED_MSG, NoticeError::CredentialFetch("token reply has no access_token".to_string()))
        })?;

        let lifetime = reply
            .expires_in
            .filter(|s| *s > 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                (
                    MALFORMED_MSG,
                    NoticeError::CredentialFetch(format!("token reply has invalid expires_in: {:?}", reply.expires_in)),
                )
            })?;

        if lifetime <= self.safety_margin {
            warn!(
                expires_in = lifetime.num_seconds(),
                safety_margin = self.safety_margin.num_seconds(),
                "token lifetime does not exceed safety margin, every call will refresh"
            );
        }

        Ok(Credential::new(token, self.clock.now() + lifetime))
    }
}
