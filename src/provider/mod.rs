//! Provider access: the two WeChat endpoints the gateway talks to.
//!
//! `WeixinApi` is the seam between the credential cache / dispatcher and the
//! network, so both can be driven by an in-memory fake in tests.

use std::future::Future;

use crate::error::NoticeError;

pub mod http;
pub mod types;

use types::{AccessTokenReply, SendReply, TemplateMessage};

pub trait WeixinApi: Send + Sync + 'static {
    /// Exchange app credentials for an access token.
    fn fetch_access_token(
        &self,
        app_id: &str,
        app_secret: &str,
    ) -> impl Future<Output = Result<AccessTokenReply, NoticeError>> + Send;

    /// Send one template message authorised by `access_token`.
    fn send_template_message(
        &self,
        access_token: &str,
        message: &TemplateMessage,
    ) -> impl Future<Output = Result<SendReply, NoticeError>> + Send;
}
