use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `errcode` the provider uses for a successful call.
pub const ERRCODE_OK: i64 = 0;

/// `errcode` values meaning the access token is no longer accepted:
/// 40001 invalid credential, 40014 invalid access_token, 42001 access_token expired.
pub const TOKEN_EXPIRED_ERRCODES: [i64; 3] = [40001, 40014, 42001];

/// Reply of `GET /cgi-bin/token`.
///
/// Success carries `access_token` + `expires_in`, failure carries `errcode` + `errmsg`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessTokenReply {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub errcode: Option<i64>,
    pub errmsg: Option<String>,
}

/// Body of `POST /cgi-bin/message/template/send`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TemplateMessage {
    pub touser: String,
    pub template_id: String,
    pub url: String,
    pub data: BTreeMap<String, TemplateValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TemplateValue {
    pub value: String,
}

impl TemplateValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Reply of the template message call.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SendReply {
    pub errcode: Option<i64>,
    pub errmsg: Option<String>,
    pub msgid: Option<i64>,
}

impl SendReply {
    pub fn is_ok(&self) -> bool {
        self.errcode == Some(ERRCODE_OK)
    }

    pub fn is_token_expired(&self) -> bool {
        self.errcode
            .map(|code| TOKEN_EXPIRED_ERRCODES.contains(&code))
            .unwrap_or(false)
    }
}
