use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the identity ledger.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub website: String,
    /// Explicit avatar reference; `None` resolves to a deterministic default.
    pub avatar: Option<String>,
    pub credits: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields required to insert a new ledger row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub credits: i64,
}

/// Whitelisted mutable profile fields. `Some` overwrites, `None` keeps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub avatar: Option<String>,
}

/// Server-held proof of authentication, time-bounded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
}

impl Session {
    /// Issue a fresh session with an opaque random token.
    pub fn issue(user_id: Uuid) -> Self {
        use rand::{distributions::Alphanumeric, Rng};
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();
        Self {
            token,
            user_id,
            issued_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Lifecycle of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VideoStatus::Pending),
            "processing" => Ok(VideoStatus::Processing),
            "completed" => Ok(VideoStatus::Completed),
            "failed" => Ok(VideoStatus::Failed),
            other => Err(format!("unknown video status: {other}")),
        }
    }
}

/// A persisted generation request and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub prompt: String,
    pub status: VideoStatus,
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Input for creating a video record together with its credit charge.
#[derive(Debug, Clone)]
pub struct VideoDraft {
    pub prompt: String,
    pub status: VideoStatus,
    pub video_url: Option<String>,
    pub thumbnail: Option<String>,
    /// Credits debited from the owner in the same atomic step.
    pub cost: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_status_roundtrips_through_str() {
        for s in ["pending", "processing", "completed", "failed"] {
            let parsed: VideoStatus = s.parse().unwrap();
            assert_eq!(parsed.to_string(), s);
        }
        assert!("done".parse::<VideoStatus>().is_err());
    }

    #[test]
    fn user_serialization_strips_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "argon2-secret".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            bio: String::new(),
            website: String::new(),
            avatar: None,
            credits: 5,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-secret"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("a@b.com"));
    }

    #[test]
    fn issued_sessions_have_distinct_opaque_tokens() {
        let user_id = Uuid::new_v4();
        let a = Session::issue(user_id);
        let b = Session::issue(user_id);
        assert_eq!(a.token.len(), 48);
        assert_ne!(a.token, b.token);
    }
}
