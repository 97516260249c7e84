// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;

use crate::config::provider::{ProviderConfig, ServiceConfig};
use crate::config::settings::{SettingsConfig, ValidationPolicy};
use crate::error::NoticeError;
use crate::provider::types::{AccessTokenReply, SendReply, TemplateMessage};
use crate::provider::WeixinApi;

pub const TEST_APP_ID: &str = "wx0123456789abcdef";
pub const TEST_APP_SECRET: &str = "0123456789abcdef0123456789abcdef";
pub const TEST_TEMPLATE_ID: &str = "tpl-notice-1";
pub const TEST_TO_USER: &str = "openid-recipient";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn provider_config(api_base_url: &str) -> ProviderConfig {
    ProviderConfig {
        app_id: TEST_APP_ID.to_owned(),
        app_secret: TEST_APP_SECRET.to_owned(),
        template_id: TEST_TEMPLATE_ID.to_owned(),
        to_user: TEST_TO_USER.to_owned(),
        api_base_url: api_base_url.to_owned(),
    }
}

pub fn service_config(api_base_url: &str, validation: ValidationPolicy) -> ServiceConfig {
    let mut settings = SettingsConfig { validation, ..Default::default() };
    settings.metrics.is_enabled = true;
    settings.http.timeout_ms = 2_000;
    ServiceConfig {
        settings,
        provider: provider_config(api_base_url),
    }
}

/// In-memory provider: hands out `tok-1`, `tok-2`, ... and records every send.
pub struct FakeWeixinApi {
    pub token_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    token_delay: Duration,
    expires_in: i64,
    token_reply: Mutex<Option<Result<AccessTokenReply, NoticeError>>>,
    send_replies: Mutex<VecDeque<Result<SendReply, NoticeError>>>,
    rejected_tokens: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, TemplateMessage)>>,
}

impl FakeWeixinApi {
    pub fn new() -> Self {
        Self {
            token_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            token_delay: Duration::ZERO,
            expires_in: 7200,
            token_reply: Mutex::new(None),
            send_replies: Mutex::new(VecDeque::new()),
            rejected_tokens: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    pub fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Every exchange answers with `reply` instead of a fresh token.
    pub fn fail_token_exchange(&self, reply: Result<AccessTokenReply, NoticeError>) {
        *self.token_reply.lock().unwrap() = Some(reply);
    }

    /// Queue the reply for the next send; unscripted sends succeed.
    pub fn script_send(&self, reply: Result<SendReply, NoticeError>) {
        self.send_replies.lock().unwrap().push_back(reply);
    }

    /// Every send authorised by `token` is answered with 42001.
    pub fn reject_token(&self, token: &str) {
        self.rejected_tokens.lock().unwrap().push(token.to_owned());
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, TemplateMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

pub fn reply_with_errcode(errcode: i64, errmsg: &str) -> SendReply {
    SendReply {
        errcode: Some(errcode),
        errmsg: Some(errmsg.to_owned()),
        msgid: None,
    }
}

impl WeixinApi for FakeWeixinApi {
    async fn fetch_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> Result<AccessTokenReply, NoticeError> {
        assert_eq!(app_id, TEST_APP_ID);
        assert_eq!(app_secret, TEST_APP_SECRET);

        let n = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.token_delay.is_zero() {
            tokio::time::sleep(self.token_delay).await;
        }

        let scripted = self.token_reply.lock().unwrap().clone();
        match scripted {
            Some(reply) => reply,
            None => Ok(AccessTokenReply {
                access_token: Some(format!("tok-{}", n)),
                expires_in: Some(self.expires_in),
                ..Default::default()
            }),
        }
    }

    async fn send_template_message(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> Result<SendReply, NoticeError> {
        let n = self.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent
            .lock()
            .unwrap()
            .push((access_token.to_owned(), message.clone()));

        let rejected = self.rejected_tokens.lock().unwrap().iter().any(|t| t == access_token);
        if rejected {
            return Ok(reply_with_errcode(42001, "access_token expired"));
        }

        let scripted = self.send_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(SendReply {
                errcode: Some(0),
                errmsg: Some("ok".to_owned()),
                msgid: Some(n as i64),
            })
        })
    }
}
