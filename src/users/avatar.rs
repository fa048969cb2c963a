use uuid::Uuid;

/// Built-in avatar set served as static assets by the frontend.
pub const DEFAULT_AVATARS: [&str; 5] = [
    "/assets/avatars/icon1.png",
    "/assets/avatars/icon2.png",
    "/assets/avatars/icon3.png",
    "/assets/avatars/icon4.png",
    "/assets/avatars/icon5.png",
];

/// Deterministic default for users without an explicit avatar: the same id
/// always resolves to the same icon (`id mod 5` over the UUID's integer
/// value).
pub fn default_avatar(id: Uuid) -> &'static str {
    let index = (id.as_u128() % DEFAULT_AVATARS.len() as u128) as usize;
    DEFAULT_AVATARS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_avatar_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(default_avatar(id), default_avatar(id));
    }

    #[test]
    fn default_avatar_follows_id_mod_len() {
        let id = Uuid::new_v4();
        let expected = DEFAULT_AVATARS[(id.as_u128() % 5) as usize];
        assert_eq!(default_avatar(id), expected);
    }
}
