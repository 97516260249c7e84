use chrono::{DateTime, Duration, Utc};

/// Provider access token with its computed expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// True once `now + safety_margin` reaches `expires_at`.
    pub fn is_stale_at(&self, now: DateTime<Utc>, safety_margin: Duration) -> bool {
        self.expires_at <= now + safety_margin
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.is_stale_at(now, Duration::zero())
    }
}

// token stays out of logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
