//! Postgres backend, selected when `DATABASE_URL` is set.
//!
//! Credit mutations use conditional `UPDATE ... WHERE credits >= $n`, and
//! `create_video` wraps the debit and the insert in one transaction, so the
//! balance invariant holds under concurrent requests.

use std::time::Duration;

use axum::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{NewUser, ProfilePatch, Session, User, Video, VideoDraft};
use super::{Store, StoreError};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, bio, website, \
                            avatar, credits, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    session_ttl: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, session_ttl: Duration) -> Self {
        Self { pool, session_ttl }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Raw videos row; `status` is stored as text and parsed on the way out.
#[derive(Debug, FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    prompt: String,
    status: String,
    video_url: Option<String>,
    thumbnail: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<VideoRow> for Video {
    type Error = StoreError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e: String| StoreError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(Video {
            id: row.id,
            user_id: row.user_id,
            prompt: row.prompt,
            status,
            video_url: row.video_url,
            thumbnail: row.thumbnail,
            created_at: row.created_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    // PostgreSQL unique constraint violation: error code 23505
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, credits)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.credits)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(StoreError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name  = COALESCE($3, last_name),
                bio        = COALESCE($4, bio),
                website    = COALESCE($5, website),
                avatar     = COALESCE($6, avatar),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.bio)
        .bind(patch.website)
        .bind(patch.avatar)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or(StoreError::NotFound("user"))
    }

    async fn balance(&self, id: Uuid) -> Result<i64, StoreError> {
        let credits = sqlx::query_scalar::<_, i64>(r#"SELECT credits FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        credits.ok_or(StoreError::NotFound("user"))
    }

    async fn credit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError> {
        let credits = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users SET credits = credits + $2, updated_at = now()
            WHERE id = $1
            RETURNING credits
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;
        credits.ok_or(StoreError::NotFound("user"))
    }

    async fn debit(&self, id: Uuid, amount: i64) -> Result<i64, StoreError> {
        let credits = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users SET credits = credits - $2, updated_at = now()
            WHERE id = $1 AND credits >= $2
            RETURNING credits
            "#,
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        match credits {
            Some(balance) => Ok(balance),
            None => {
                // Distinguishes a missing user from a short balance.
                let balance = self.balance(id).await?;
                Err(StoreError::InsufficientCredits {
                    balance,
                    requested: amount,
                })
            }
        }
    }

    async fn put_session(&self, session: Session) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token) DO UPDATE SET user_id = $2, issued_at = $3
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.issued_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(
            r#"SELECT token, user_id, issued_at FROM sessions WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        // Lazy expiry: purge on read, no background timer.
        let age = OffsetDateTime::now_utc() - session.issued_at;
        let ttl = time::Duration::try_from(self.session_ttl).unwrap_or(time::Duration::MAX);
        if age > ttl {
            self.delete_session(token).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM sessions WHERE token = $1"#)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_video(&self, owner: Uuid, draft: VideoDraft) -> Result<Video, StoreError> {
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users SET credits = credits - $2, updated_at = now()
            WHERE id = $1 AND credits >= $2
            RETURNING credits
            "#,
        )
        .bind(owner)
        .bind(draft.cost)
        .fetch_optional(&mut *tx)
        .await?;

        if debited.is_none() {
            let balance =
                sqlx::query_scalar::<_, i64>(r#"SELECT credits FROM users WHERE id = $1"#)
                    .bind(owner)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match balance {
                Some(balance) => StoreError::InsufficientCredits {
                    balance,
                    requested: draft.cost,
                },
                None => StoreError::NotFound("user"),
            });
        }

        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            INSERT INTO videos (id, user_id, prompt, status, video_url, thumbnail)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, prompt, status, video_url, thumbnail, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&draft.prompt)
        .bind(draft.status.to_string())
        .bind(&draft.video_url)
        .bind(&draft.thumbnail)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        row.try_into()
    }

    async fn list_videos(&self, owner: Uuid) -> Result<Vec<Video>, StoreError> {
        let rows = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, user_id, prompt, status, video_url, thumbnail, created_at
            FROM videos
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Video::try_from).collect()
    }

    async fn get_video(&self, owner: Uuid, id: Uuid) -> Result<Option<Video>, StoreError> {
        let row = sqlx::query_as::<_, VideoRow>(
            r#"
            SELECT id, user_id, prompt, status, video_url, thumbnail, created_at
            FROM videos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Video::try_from).transpose()
    }

    async fn delete_video(&self, owner: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(r#"DELETE FROM videos WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
