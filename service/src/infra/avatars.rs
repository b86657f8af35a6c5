//! [`Avatars`] resolution.

use xxhash_rust::xxh3::xxh3_128;

use crate::domain::{user, User};

/// Resolver of [`User`]s' avatars.
pub trait Avatars {
    /// Resolves the [`user::Avatar`] of the given [`User`].
    fn resolve(&self, user: &User) -> user::Avatar;
}

/// [`Avatars`] resolver deriving avatars from [`user::Email`]s.
///
/// The [`user::Avatar`] is the [XXH3]-128 hash of the lowercased trimmed
/// email, rendered as 32 hexadecimal digits. [`User`]s without an email are
/// hashed by their [`user::Login`] instead.
///
/// [XXH3]: https://github.com/Cyan4973/xxHash
#[derive(Clone, Copy, Debug, Default)]
pub struct EmailHashes;

impl Avatars for EmailHashes {
    fn resolve(&self, user: &User) -> user::Avatar {
        let source: &str = user
            .email
            .as_ref()
            .map_or_else(|| user.login.as_ref(), AsRef::as_ref);
        let digest = xxh3_128(source.trim().to_lowercase().as_bytes());
        user::Avatar::new(format!("{digest:032x}"))
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{user, User};

    use super::{Avatars as _, EmailHashes};

    fn user(email: Option<&str>) -> User {
        User {
            id: user::Id::new(),
            login: "alice".parse().unwrap(),
            name: "Alice Doe".parse().unwrap(),
            email: email.map(|e| e.parse().unwrap()),
            active: true,
            local: true,
            external_provider: None,
            external_login: None,
            scm_accounts: vec![],
            connected_at: None,
        }
    }

    #[test]
    fn resolve() {
        let avatar = EmailHashes.resolve(&user(Some("alice@example.com")));
        let hex: &str = avatar.as_ref();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));

        // Stable across invocations and letter case.
        assert_eq!(
            EmailHashes.resolve(&user(Some("alice@example.com"))),
            avatar,
        );
        assert_eq!(
            EmailHashes.resolve(&user(Some("Alice@Example.COM"))),
            avatar,
        );

        // Without an email the login feeds the hash.
        let fallback = EmailHashes.resolve(&user(None));
        let hex: &str = fallback.as_ref();
        assert_eq!(hex.len(), 32);
        assert_ne!(fallback, avatar);
    }
}
