//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// Caller of the service, on whose behalf an operation is executed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Session {
    /// Caller not authenticated as any [`User`].
    Anonymous,

    /// Caller authenticated as a [`User`].
    Authenticated(Claims),
}

impl Session {
    /// Indicates whether this [`Session`] is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Indicates whether this [`Session`] belongs to a system administrator.
    #[must_use]
    pub const fn is_system_administrator(&self) -> bool {
        match self {
            Self::Authenticated(claims) => claims.system_administrator,
            Self::Anonymous => false,
        }
    }

    /// Returns the [`user::Id`] this [`Session`] is authenticated as, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<user::Id> {
        match self {
            Self::Authenticated(claims) => Some(claims.user_id),
            Self::Anonymous => None,
        }
    }
}

/// Claims of an authenticated [`Session`], as carried by its [`Token`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Claims {
    /// ID of the [`User`] the [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// Indicator whether the [`User`] administers the platform.
    #[serde(default, rename = "sysadmin")]
    pub system_administrator: bool,

    /// [`DateTime`] when the [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;
