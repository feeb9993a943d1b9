use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record supplied by the external auth subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Member {
    /// An active member with no expiry.
    pub fn active(id: i64) -> Self {
        Self {
            id,
            is_active: true,
            expires_at: None,
        }
    }

    /// Returns `true` once `now` is past the account's expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at < now)
    }
}
