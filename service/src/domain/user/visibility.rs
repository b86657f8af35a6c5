//! Field [`Visibility`] definitions.

use super::{Session, User};

/// Visibility of a [`User`]'s fields for a concrete caller.
///
/// Each grant unlocks a fixed group of fields, and the grants are cumulative:
/// a [`privileged`] caller is always an [`authenticated`] one.
///
/// [`authenticated`]: Visibility::authenticated
/// [`privileged`]: Visibility::privileged
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Visibility {
    /// Grant of the fields visible to any authenticated caller.
    pub authenticated: bool,

    /// Grant of the fields visible to the [`User`] themselves and to system
    /// administrators only.
    pub privileged: bool,
}

impl Visibility {
    /// Resolves the [`Visibility`] of the given [`User`]'s fields for the
    /// given [`Session`].
    #[must_use]
    pub fn of(session: &Session, user: &User) -> Self {
        Self {
            authenticated: session.is_authenticated(),
            privileged: session.is_system_administrator()
                || session.user_id() == Some(user.id),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTimeOf;
    use uuid::Uuid;

    use crate::domain::{
        user::{self, session::Claims},
        User,
    };

    use super::{Session, Visibility};

    fn user(id: user::Id) -> User {
        User {
            id,
            login: "alice".parse().unwrap(),
            name: "Alice Doe".parse().unwrap(),
            email: None,
            active: true,
            local: true,
            external_provider: None,
            external_login: None,
            scm_accounts: vec![],
            connected_at: None,
        }
    }

    fn session(id: user::Id, admin: bool) -> Session {
        Session::Authenticated(Claims {
            user_id: id,
            system_administrator: admin,
            expires_at: DateTimeOf::UNIX_EPOCH,
        })
    }

    #[test]
    fn of() {
        let alice = user(user::Id::from(Uuid::from_u128(1)));
        let bob_id = user::Id::from(Uuid::from_u128(2));

        assert_eq!(
            Visibility::of(&Session::Anonymous, &alice),
            Visibility {
                authenticated: false,
                privileged: false,
            },
        );
        assert_eq!(
            Visibility::of(&session(bob_id, false), &alice),
            Visibility {
                authenticated: true,
                privileged: false,
            },
        );
        assert_eq!(
            Visibility::of(&session(alice.id, false), &alice),
            Visibility {
                authenticated: true,
                privileged: true,
            },
        );
        assert_eq!(
            Visibility::of(&session(bob_id, true), &alice),
            Visibility {
                authenticated: true,
                privileged: true,
            },
        );
    }
}
