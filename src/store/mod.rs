use axum::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use types::{NewUser, ProfilePatch, Session, User, Video, VideoDraft, VideoStatus};

/// Storage-layer failures. Domain variants map to client errors at the HTTP
/// layer; `Database` maps to a sanitized 500.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,

    #[error("insufficient credits: balance {balance}, requested {requested}")]
    InsufficientCredits { balance: i64, requested: i64 },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The authoritative table of users, sessions and video records.
///
/// Two backends implement this: [`MemoryStore`] (demo default, also used by
/// the test suite) and [`PgStore`] (selected when `DATABASE_URL` is set).
/// Credit mutations are atomic per user in both: the balance invariant
/// `credits >= 0` holds under concurrent requests.
#[async_trait]
pub trait Store: Send + Sync {
    // --- identity ledger ---

    /// Insert a new user. Fails with [`StoreError::EmailTaken`] when the
    /// email is already present, leaving the ledger unchanged.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Merge whitelisted mutable fields and refresh `updated_at`.
    /// Last-write-wins.
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, StoreError>;

    // --- credit accounting ---

    async fn balance(&self, id: Uuid) -> Result<i64, StoreError>;

    /// Unconditional increment; `amount` must be positive (callers validate).
    async fn credit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError>;

    /// All-or-nothing decrement. Fails with
    /// [`StoreError::InsufficientCredits`] without mutation when the balance
    /// is too low.
    async fn debit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError>;

    // --- sessions ---

    async fn put_session(&self, session: Session) -> Result<(), StoreError>;

    /// Look up a session by token, applying lazy TTL expiry: an expired
    /// session is purged and reads as `None`. Unknown tokens read as `None`.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError>;

    /// Idempotent: deleting an absent token is a no-op.
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    // --- video records ---

    /// Debit `draft.cost` from the owner and insert the record in one atomic
    /// step. On [`StoreError::InsufficientCredits`] nothing is persisted.
    async fn create_video(&self, owner: Uuid, draft: VideoDraft) -> Result<Video, StoreError>;

    /// Owner's records, newest first.
    async fn list_videos(&self, owner: Uuid) -> Result<Vec<Video>, StoreError>;

    /// Scoped by owner: a record belonging to another user reads as `None`.
    async fn get_video(&self, owner: Uuid, id: Uuid) -> Result<Option<Video>, StoreError>;

    /// Returns `true` when a record was deleted, `false` when absent or
    /// owned by someone else.
    async fn delete_video(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError>;
}
