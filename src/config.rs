use serde::Deserialize;

/// Placeholder media returned by the stubbed generator. Real generation is
/// out of scope for this demo.
const DEFAULT_SAMPLE_VIDEO_URL: &str =
    "https://sample-videos.com/video123/mp4/720/big_buck_bunny_720p_1mb.mp4";
const DEFAULT_SAMPLE_THUMBNAIL: &str = "/assets/images/previews/generated.jpg";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// When unset the app runs against the in-memory store.
    pub database_url: Option<String>,
    pub session_ttl_hours: i64,
    /// Credits granted to every fresh signup.
    pub signup_bonus: i64,
    /// Credits debited per generation request.
    pub generation_cost: i64,
    pub sample_video_url: String,
    pub sample_thumbnail: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
            signup_bonus: std::env::var("SIGNUP_BONUS_CREDITS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5),
            generation_cost: std::env::var("GENERATION_COST_CREDITS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(1),
            sample_video_url: std::env::var("SAMPLE_VIDEO_URL")
                .unwrap_or_else(|_| DEFAULT_SAMPLE_VIDEO_URL.into()),
            sample_thumbnail: std::env::var("SAMPLE_THUMBNAIL")
                .unwrap_or_else(|_| DEFAULT_SAMPLE_THUMBNAIL.into()),
        })
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs((self.session_ttl_hours as u64) * 60 * 60)
    }

    /// Fixed settings for unit and integration tests.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            session_ttl_hours: 24,
            signup_bonus: 5,
            generation_cost: 1,
            sample_video_url: DEFAULT_SAMPLE_VIDEO_URL.into(),
            sample_thumbnail: DEFAULT_SAMPLE_THUMBNAIL.into(),
        }
    }
}
