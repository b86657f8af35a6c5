//! [`User`] definitions.

pub mod session;
pub mod visibility;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::{session::Session, visibility::Visibility};

/// Platform user, as recorded in the authoritative identity store.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Option<Email>,

    /// Indicator whether this [`User`] is active.
    pub active: bool,

    /// Indicator whether this [`User`] authenticates locally rather than
    /// through an [`IdentityProvider`].
    pub local: bool,

    /// [`IdentityProvider`] this [`User`] authenticates through.
    pub external_provider: Option<IdentityProvider>,

    /// [`ExternalLogin`] of this [`User`] in its [`IdentityProvider`].
    pub external_login: Option<ExternalLogin>,

    /// [`ScmAccount`]s of this [`User`].
    pub scm_accounts: Vec<ScmAccount>,

    /// [`DateTime`] when this [`User`] connected last time.
    pub connected_at: Option<ConnectionDateTime>,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Login of a [`User`], uniquely identifying it across the platform.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `login` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Login`] invariants:
        /// - Must start with a letter or a digit;
        /// - Must contain only letters, digits, `.`, `_`, `@` and `-`;
        /// - Must be between 2 and 255 characters long.
        ///
        /// The `{1,254}` repetition of Unicode classes compiles beyond the
        /// default 10 MiB size limit, so a larger one is set.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            RegexBuilder::new(r"^[\p{L}\p{N}][\p{L}\p{N}._@-]{1,254}$")
                .size_limit(20 << 20)
                .build()
                .expect("valid regex")
        });

        REGEX.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 200
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 100 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// External identity provider a [`User`] authenticates through.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct IdentityProvider(String);

impl IdentityProvider {
    /// Creates a new [`IdentityProvider`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `key` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Creates a new [`IdentityProvider`] if the given `key` is valid.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        Self::check(&key).then_some(Self(key))
    }

    /// Checks whether the given `key` is a valid [`IdentityProvider`].
    fn check(key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        key.trim() == key && !key.is_empty() && key.len() <= 100
    }
}

impl FromStr for IdentityProvider {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `IdentityProvider`")
    }
}

/// Login of a [`User`] in its [`IdentityProvider`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ExternalLogin(String);

impl ExternalLogin {
    /// Creates a new [`ExternalLogin`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `login` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// Creates a new [`ExternalLogin`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`ExternalLogin`].
    fn check(login: impl AsRef<str>) -> bool {
        let login = login.as_ref();
        !login.is_empty() && login.len() <= 255
    }
}

impl FromStr for ExternalLogin {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ExternalLogin`")
    }
}

/// Account of a [`User`] in a source code management system.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ScmAccount(String);

impl ScmAccount {
    /// Creates a new [`ScmAccount`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `account` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(account: impl Into<String>) -> Self {
        Self(account.into())
    }

    /// Creates a new [`ScmAccount`] if the given `account` is valid.
    #[must_use]
    pub fn new(account: impl Into<String>) -> Option<Self> {
        let account = account.into();
        Self::check(&account).then_some(Self(account))
    }

    /// Checks whether the given `account` is a valid [`ScmAccount`].
    fn check(account: impl AsRef<str>) -> bool {
        let account = account.as_ref();
        account.trim() == account && !account.is_empty() && account.len() <= 255
    }
}

impl FromStr for ScmAccount {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ScmAccount`")
    }
}

/// Avatar of a [`User`], derived from its identity.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Avatar(String);

impl Avatar {
    /// Creates a new [`Avatar`] out of its rendered representation.
    #[must_use]
    pub fn new(rendered: impl Into<String>) -> Self {
        Self(rendered.into())
    }
}

/// [`DateTime`] when a [`User`] connected last time.
pub type ConnectionDateTime = DateTimeOf<(User, unit::Connection)>;

#[cfg(test)]
mod spec {
    use super::{Email, Login, Name};

    #[test]
    fn login() {
        assert!(Login::new("alice").is_some());
        assert!(Login::new("bob.builder@corp").is_some());
        assert!(Login::new("42-devs").is_some());
        assert!(Login::new("ab").is_some());
        assert!(Login::new("a").is_none());
        assert!(Login::new("").is_none());
        assert!(Login::new(".dot-first").is_none());
        assert!(Login::new("has space").is_none());
        assert!(Login::new("l".repeat(255)).is_some());
        assert!(Login::new("l".repeat(256)).is_none());
    }

    #[test]
    fn name() {
        assert!(Name::new("Alice Doe").is_some());
        assert!(Name::new("").is_none());
        assert!(Name::new(" padded ").is_none());
        assert!(Name::new("n".repeat(201)).is_none());
    }

    #[test]
    fn email() {
        assert!(Email::new("alice@example.com").is_some());
        assert!(Email::new("a.b+c@mail.dev").is_some());
        assert!(Email::new("not-an-email").is_none());
        assert!(Email::new("has @space.com").is_none());
        assert!(Email::new("no@tld").is_none());
    }
}
