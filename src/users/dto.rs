use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::User;
use crate::users::avatar::default_avatar;

/// Profile view returned to clients: credential material stripped, avatar
/// resolved to either the explicit reference or the deterministic default.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub website: String,
    pub avatar: String,
    pub credits: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        let avatar = user
            .avatar
            .unwrap_or_else(|| default_avatar(user.id).to_string());
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            website: user.website,
            avatar,
            credits: user.credits,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::avatar::DEFAULT_AVATARS;

    fn user(avatar: Option<String>) -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            password_hash: "hash".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            bio: String::new(),
            website: String::new(),
            avatar,
            credits: 5,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn view_resolves_default_avatar_from_id() {
        let user = user(None);
        let expected = DEFAULT_AVATARS[(user.id.as_u128() % 5) as usize];
        let view = UserView::from(user);
        assert_eq!(view.avatar, expected);
    }

    #[test]
    fn view_keeps_explicit_avatar() {
        let view = UserView::from(user(Some("/uploads/me.png".into())));
        assert_eq!(view.avatar, "/uploads/me.png");
    }
}
