use serde::{Deserialize, Serialize};

use crate::config::settings::ValidationPolicy;
use crate::error::NoticeError;
use crate::provider::types::SendReply;

/// Inbound "send a notice" request.
///
/// Every field may be missing on the wire; `validate` decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeRequest {
    /// label of the originating system
    pub platform: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    /// link the recipient may follow
    pub jump_url: Option<String>,
}

impl NoticeRequest {
    pub fn new(
        platform: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
        jump_url: impl Into<String>,
    ) -> Self {
        Self {
            platform: Some(platform.into()),
            subject: Some(subject.into()),
            description: Some(description.into()),
            jump_url: Some(jump_url.into()),
        }
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("platform", self.platform.as_deref()),
            ("subject", self.subject.as_deref()),
            ("description", self.description.as_deref()),
            ("jumpUrl", self.jump_url.as_deref()),
        ]
    }

    /// Check the request against `policy`, before any network call.
    pub fn validate(&self, policy: ValidationPolicy) -> Result<ValidatedNotice, NoticeError> {
        let missing: Vec<&str> = self
            .fields()
            .iter()
            .filter(|(_, value)| value.map(|v| v.trim().is_empty()).unwrap_or(true))
            .map(|(name, _)| *name)
            .collect();

        match policy {
            ValidationPolicy::Strict if !missing.is_empty() => {
                return Err(NoticeError::InvalidRequest(format!(
                    "missing required fields: {}",
                    missing.join(", ")
                )));
            }
            ValidationPolicy::Lenient if missing.len() == self.fields().len() => {
                return Err(NoticeError::InvalidRequest("notice request is empty".to_string()));
            }
            _ => {}
        }

        Ok(ValidatedNotice {
            platform: self.platform.clone().unwrap_or_default(),
            subject: self.subject.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            jump_url: self.jump_url.clone().unwrap_or_default(),
        })
    }
}

/// Request that passed validation; missing fields (lenient policy only) are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedNotice {
    pub platform: String,
    pub subject: String,
    pub description: String,
    pub jump_url: String,
}

/// Outcome of exactly one dispatch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg_id: Option<i64>,
}

impl NoticeResponse {
    /// Only `errcode == 0` counts as success; a reply without errcode is a failure.
    pub fn from_reply(reply: SendReply) -> Self {
        let success = reply.is_ok();
        let message = match (&reply.errcode, reply.errmsg) {
            (None, None) => Some("provider reply carries no errcode".to_string()),
            (None, Some(msg)) => Some(format!("provider reply carries no errcode: {}", msg)),
            (Some(_), msg) => msg,
        };
        Self {
            success,
            code: reply.errcode,
            message,
            msg_id: reply.msgid,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn code(&self) -> Option<i64> {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn msg_id(&self) -> Option<i64> {
        self.msg_id
    }
}
