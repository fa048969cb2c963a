//! In-memory backend: plain maps behind a `tokio::sync::RwLock`.
//!
//! This is the demo default (no `DATABASE_URL`) and what the test suite
//! runs against. All mutations take the single write lock, so credit
//! updates are serialized per process and the non-negative balance
//! invariant holds without further coordination. Data is lost on drop.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{NewUser, ProfilePatch, Session, User, Video, VideoDraft};
use super::{Store, StoreError};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Session>,
    /// Insertion order preserved; list queries sort by `created_at` on top.
    videos: Vec<Video>,
}

#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<tokio::sync::RwLock<Inner>>,
    session_ttl: Duration,
}

impl MemoryStore {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(Inner::default())),
            session_ttl,
        }
    }

    /// Number of ledger rows (used by tests to assert no-duplicate signup).
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

fn expired(session: &Session, ttl: Duration) -> bool {
    let age = OffsetDateTime::now_utc() - session.issued_at;
    age > time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX)
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            bio: String::new(),
            website: String::new(),
            avatar: None,
            credits: new.credits,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        if let Some(v) = patch.first_name {
            user.first_name = v;
        }
        if let Some(v) = patch.last_name {
            user.last_name = v;
        }
        if let Some(v) = patch.bio {
            user.bio = v;
        }
        if let Some(v) = patch.website {
            user.website = v;
        }
        if let Some(v) = patch.avatar {
            user.avatar = Some(v);
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn balance(&self, id: Uuid) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        let user = inner.users.get(&id).ok_or(StoreError::NotFound("user"))?;
        Ok(user.credits)
    }

    async fn credit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        user.credits += amount;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.credits)
    }

    async fn debit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        if user.credits < amount {
            return Err(StoreError::InsufficientCredits {
                balance: user.credits,
                requested: amount,
            });
        }
        user.credits -= amount;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.credits)
    }

    async fn put_session(&self, session: Session) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        // Lazy expiry: checked only on read, expired rows are purged here.
        let mut inner = self.inner.write().await;
        match inner.sessions.get(token) {
            Some(s) if expired(s, self.session_ttl) => {
                inner.sessions.remove(token);
                Ok(None)
            }
            Some(s) => Ok(Some(s.clone())),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.inner.write().await.sessions.remove(token);
        Ok(())
    }

    async fn create_video(&self, owner: Uuid, draft: VideoDraft) -> Result<Video, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&owner)
            .ok_or(StoreError::NotFound("user"))?;
        if user.credits < draft.cost {
            return Err(StoreError::InsufficientCredits {
                balance: user.credits,
                requested: draft.cost,
            });
        }
        user.credits -= draft.cost;
        user.updated_at = OffsetDateTime::now_utc();

        let video = Video {
            id: Uuid::new_v4(),
            user_id: owner,
            prompt: draft.prompt,
            status: draft.status,
            video_url: draft.video_url,
            thumbnail: draft.thumbnail,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.videos.push(video.clone());
        Ok(video)
    }

    async fn list_videos(&self, owner: Uuid) -> Result<Vec<Video>, StoreError> {
        let inner = self.inner.read().await;
        let mut out: Vec<Video> = inner
            .videos
            .iter()
            .rev()
            .filter(|v| v.user_id == owner)
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep newest-inserted first.
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_video(&self, owner: Uuid, id: Uuid) -> Result<Option<Video>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .videos
            .iter()
            .find(|v| v.id == id && v.user_id == owner)
            .cloned())
    }

    async fn delete_video(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.videos.len();
        inner.videos.retain(|v| !(v.id == id && v.user_id == owner));
        Ok(inner.videos.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::VideoStatus;

    fn store() -> MemoryStore {
        MemoryStore::new(Duration::from_secs(24 * 60 * 60))
    }

    async fn seed_user(store: &MemoryStore, email: &str, credits: i64) -> User {
        store
            .create_user(NewUser {
                email: email.into(),
                password_hash: "hash".into(),
                first_name: "A".into(),
                last_name: "B".into(),
                credits,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_leaves_ledger_unchanged() {
        let store = store();
        seed_user(&store, "a@b.com", 5).await;

        let err = store
            .create_user(NewUser {
                email: "a@b.com".into(),
                password_hash: "other".into(),
                first_name: "C".into(),
                last_name: "D".into(),
                credits: 5,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::EmailTaken));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn over_balance_debit_fails_without_mutation() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 3).await;

        let err = store.debit(user.id, 4).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientCredits {
                balance: 3,
                requested: 4
            }
        ));
        assert_eq!(store.balance(user.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn balance_never_goes_negative_across_sequences() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 2).await;

        // debit, credit, debit-too-much, debit: balance stays >= 0 throughout
        for (op, amount) in [("debit", 2), ("credit", 3), ("debit", 10), ("debit", 3)] {
            let _ = match op {
                "debit" => store.debit(user.id, amount).await,
                _ => store.credit(user.id, amount).await,
            };
            assert!(store.balance(user.id).await.unwrap() >= 0);
        }
        assert_eq!(store.balance(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn session_roundtrip_and_lazy_expiry() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 5).await;

        let session = Session::issue(user.id);
        store.put_session(session.clone()).await.unwrap();
        let read = store.get_session(&session.token).await.unwrap().unwrap();
        assert_eq!(read.user_id, user.id);

        // Backdate past the 24h TTL: next read purges and returns None.
        let mut stale = Session::issue(user.id);
        stale.issued_at = OffsetDateTime::now_utc() - time::Duration::hours(25);
        store.put_session(stale.clone()).await.unwrap();
        assert!(store.get_session(&stale.token).await.unwrap().is_none());
        assert!(store.get_session(&stale.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_session_is_idempotent() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 5).await;
        let session = Session::issue(user.id);
        store.put_session(session.clone()).await.unwrap();

        store.delete_session(&session.token).await.unwrap();
        store.delete_session(&session.token).await.unwrap();
        assert!(store.get_session(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_video_charges_and_scopes_by_owner() {
        let store = store();
        let u1 = seed_user(&store, "u1@b.com", 5).await;
        let u2 = seed_user(&store, "u2@b.com", 5).await;

        let video = store
            .create_video(
                u1.id,
                VideoDraft {
                    prompt: "sunset beach".into(),
                    status: VideoStatus::Completed,
                    video_url: Some("https://example.com/v.mp4".into()),
                    thumbnail: None,
                    cost: 1,
                },
            )
            .await
            .unwrap();

        assert_eq!(store.balance(u1.id).await.unwrap(), 4);
        let listed = store.list_videos(u1.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].prompt, "sunset beach");
        assert_eq!(listed[0].status, VideoStatus::Completed);

        // Foreign records read as absent, not forbidden.
        assert!(store.get_video(u2.id, video.id).await.unwrap().is_none());
        assert!(!store.delete_video(u2.id, video.id).await.unwrap());
        assert!(store.delete_video(u1.id, video.id).await.unwrap());
    }

    #[tokio::test]
    async fn create_video_with_no_credits_persists_nothing() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 0).await;

        let err = store
            .create_video(
                user.id,
                VideoDraft {
                    prompt: "anything".into(),
                    status: VideoStatus::Completed,
                    video_url: None,
                    thumbnail: None,
                    cost: 1,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InsufficientCredits { .. }));
        assert!(store.list_videos(user.id).await.unwrap().is_empty());
        assert_eq!(store.balance(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_videos_is_newest_first() {
        let store = store();
        let user = seed_user(&store, "a@b.com", 5).await;
        for prompt in ["first", "second", "third"] {
            store
                .create_video(
                    user.id,
                    VideoDraft {
                        prompt: prompt.into(),
                        status: VideoStatus::Completed,
                        video_url: None,
                        thumbnail: None,
                        cost: 1,
                    },
                )
                .await
                .unwrap();
        }

        let prompts: Vec<String> = store
            .list_videos(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.prompt)
            .collect();
        assert_eq!(prompts, vec!["third", "second", "first"]);
    }
}
