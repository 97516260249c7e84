use thiserror::Error;

/// Failure kinds surfaced by the notice pipeline.
///
/// Provider replies with a non-zero `errcode` are not errors: they resolve to
/// a `NoticeResponse` with `success == false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoticeError {
    /// Absent or malformed request, rejected before any network call.
    #[error("invalid notice request: {0}")]
    InvalidRequest(String),

    /// The access token exchange failed or returned an unusable payload.
    #[error("credential fetch failed: {0}")]
    CredentialFetch(String),

    /// The template message call failed at transport or protocol level.
    #[error("notice dispatch failed: {0}")]
    Dispatch(String),
}

impl NoticeError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            NoticeError::InvalidRequest(_) => "invalid_request",
            NoticeError::CredentialFetch(_) => "credential_fetch",
            NoticeError::Dispatch(_) => "dispatch",
        }
    }
}
