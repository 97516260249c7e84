use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new().expect("static metric definitions are valid")
    }).await
}

pub static OUTCOME_SUCCESS: &str = "success";
pub static OUTCOME_REJECTED: &str = "rejected";
pub static OUTCOME_FAILURE: &str = "failure";

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Credential metrics
    pub credential_fetch_requests: IntCounter,
    pub credential_fetch_failures: IntCounterVec,
    pub credential_fetch_duration: HistogramVec,
    pub credential_expiry_unix: IntGauge,

    // Notice metrics
    pub notice_dispatches: IntCounterVec,
    pub notice_dispatch_duration: HistogramVec,
    pub token_expired_resends: IntCounter,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> prometheus::Result<Arc<Self>> {
        let registry = Registry::new_custom(Some("weixinnotice".into()), None)?;

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Credential
            credential_fetch_requests: IntCounter::new("credential_fetch_requests_total", "Access token exchange attempts")?,
            credential_fetch_failures: IntCounterVec::new(Opts::new("credential_fetch_failures_total", "Access token exchange failures by reason"), &["reason"])?,
            credential_fetch_duration: HistogramVec::new(HistogramOpts::new("credential_fetch_duration_seconds", "Access token exchange duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["outcome"])?,
            credential_expiry_unix: IntGauge::new("credential_expiry_unix_seconds", "Expiry timestamp of the cached access token")?,

            // Notice
            notice_dispatches: IntCounterVec::new(Opts::new("notice_dispatches_total", "Notice dispatches by outcome"), &["outcome"])?,
            notice_dispatch_duration: HistogramVec::new(HistogramOpts::new("notice_dispatch_duration_seconds", "Notice dispatch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["outcome"])?,
            token_expired_resends: IntCounter::new("token_expired_resends_total", "Resends after the provider rejected an expired token")?,

            // Config/runtime
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup")?,
            up: IntGauge::new("up", "1 if service is healthy")?,

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.credential_fetch_requests.clone()))?;
        reg.register(Box::new(metrics.credential_fetch_failures.clone()))?;
        reg.register(Box::new(metrics.credential_fetch_duration.clone()))?;
        reg.register(Box::new(metrics.credential_expiry_unix.clone()))?;
        reg.register(Box::new(metrics.notice_dispatches.clone()))?;
        reg.register(Box::new(metrics.notice_dispatch_duration.clone()))?;
        reg.register(Box::new(metrics.token_expired_resends.clone()))?;
        reg.register(Box::new(metrics.config_validation_errors.clone()))?;
        reg.register(Box::new(metrics.up.clone()))?;

        Ok(metrics)
    }
}
