//! [`User`] read models definitions.
//!
//! [`User`]: crate::domain::User

pub mod search {
    //! [`User`]s search definitions.
    //!
    //! [`User`]: crate::domain::User

    use std::collections::{BTreeSet, HashMap};

    use derive_more::{Display, Error, From, Into};
    use smart_default::SmartDefault;

    use crate::domain::{
        group,
        user::{self, Visibility},
        User,
    };

    /// Validated criteria of a [`User`]s search.
    #[derive(Clone, Debug, Eq, PartialEq, SmartDefault)]
    pub struct Criteria {
        /// Text to search [`User`]s by.
        ///
        /// Holds at least [`Criteria::MIN_QUERY_LENGTH`] characters whenever
        /// present.
        pub query: Option<String>,

        /// Indicator whether deactivated [`User`]s are searched instead of
        /// active ones.
        pub deactivated: bool,

        /// 1-based index of the requested page.
        #[default(Criteria::DEFAULT_PAGE)]
        pub page: u32,

        /// Number of [`User`]s forming the requested page.
        #[default(Criteria::DEFAULT_PAGE_SIZE)]
        pub page_size: u32,
    }

    impl Criteria {
        /// Default [`Criteria::page`].
        pub const DEFAULT_PAGE: u32 = 1;

        /// Default [`Criteria::page_size`].
        pub const DEFAULT_PAGE_SIZE: u32 = 50;

        /// Maximum allowed [`Criteria::page_size`].
        pub const MAX_PAGE_SIZE: u32 = 500;

        /// Minimum allowed length of a [`Criteria::query`], in characters.
        pub const MIN_QUERY_LENGTH: usize = 2;

        /// Creates new [`Criteria`] out of the provided raw parameters,
        /// filling the omitted ones with defaults.
        ///
        /// An empty `query` is treated as an omitted one.
        ///
        /// # Errors
        ///
        /// If any of the provided parameters violates its bounds.
        pub fn new(
            query: Option<String>,
            deactivated: Option<bool>,
            page: Option<u32>,
            page_size: Option<u32>,
        ) -> Result<Self, InvalidCriteria> {
            use InvalidCriteria as E;

            let query = query.filter(|q| !q.is_empty());
            if let Some(q) = &query {
                if q.chars().count() < Self::MIN_QUERY_LENGTH {
                    return Err(E::QueryTooShort);
                }
            }

            let page = page.unwrap_or(Self::DEFAULT_PAGE);
            if page == 0 {
                return Err(E::PageIsNotPositive);
            }

            let page_size = page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE);
            if page_size == 0 {
                return Err(E::PageSizeIsNotPositive);
            }
            if page_size > Self::MAX_PAGE_SIZE {
                return Err(E::PageSizeTooLarge);
            }

            Ok(Self {
                query,
                deactivated: deactivated.unwrap_or_default(),
                page,
                page_size,
            })
        }

        /// Returns the number of [`User`]s preceding the requested page.
        #[must_use]
        pub fn offset(&self) -> u64 {
            common::Paging::offset_of(self.page, self.page_size)
        }
    }

    /// Error of validating [`Criteria`].
    #[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
    pub enum InvalidCriteria {
        /// [`Criteria::page`] is zero.
        #[display("`page` must be a positive number")]
        PageIsNotPositive,

        /// [`Criteria::page_size`] is zero.
        #[display("`pageSize` must be a positive number")]
        PageSizeIsNotPositive,

        /// [`Criteria::page_size`] exceeds [`Criteria::MAX_PAGE_SIZE`].
        #[display("`pageSize` must not exceed {}", Criteria::MAX_PAGE_SIZE)]
        PageSizeTooLarge,

        /// [`Criteria::query`] is shorter than
        /// [`Criteria::MIN_QUERY_LENGTH`].
        #[display(
            "`query` must contain at least {} characters",
            Criteria::MIN_QUERY_LENGTH
        )]
        QueryTooShort,
    }

    /// Selector of a window of [`User`] hits in the search index.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Selector {
        /// Text to match [`User`]s against.
        pub text: Option<String>,

        /// Activity state the selected [`User`]s must be in.
        pub active: bool,

        /// Number of leading hits to skip.
        pub offset: u64,

        /// Maximum number of hits to select.
        pub limit: u32,
    }

    impl From<&Criteria> for Selector {
        fn from(criteria: &Criteria) -> Self {
            Self {
                text: criteria.query.clone(),
                active: !criteria.deactivated,
                offset: criteria.offset(),
                limit: criteria.page_size,
            }
        }
    }

    /// Window of [`User`] hits selected from the search index.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Hits {
        /// [`user::Login`]s of the hit [`User`]s, in the index's ranking
        /// order.
        pub logins: Vec<user::Login>,

        /// Total number of [`User`]s matching the [`Selector`], disregarding
        /// its window.
        pub total: u64,
    }

    /// Count of access tokens of a [`User`].
    #[derive(Clone, Copy, Debug, Default, Eq, From, Hash, Into, PartialEq)]
    pub struct TokenCount(i32);

    /// [`group::Name`]s of the groups [`User`]s belong to, per
    /// [`user::Login`].
    pub type GroupsByLogin = HashMap<user::Login, BTreeSet<group::Name>>;

    /// [`TokenCount`]s per [`user::Login`].
    pub type TokenCounts = HashMap<user::Login, TokenCount>;

    /// Indicators of [`User`]s being managed by an external system, per
    /// [`user::Id`].
    pub type ManagedFlags = HashMap<user::Id, bool>;

    /// Single [`User`] entry of a search [`Page`], shaped by a
    /// [`Visibility`].
    ///
    /// Fields not granted by the [`Visibility`] are [`None`], whatever the
    /// underlying [`User`] holds.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Record {
        /// [`user::Login`] of the [`User`].
        pub login: user::Login,

        /// [`user::Name`] of the [`User`].
        pub name: user::Name,

        /// [`user::Avatar`] of the [`User`].
        pub avatar: Option<user::Avatar>,

        /// Indicator whether the [`User`] is active.
        pub active: Option<bool>,

        /// Indicator whether the [`User`] authenticates locally.
        pub local: Option<bool>,

        /// [`user::IdentityProvider`] the [`User`] authenticates through.
        pub external_provider: Option<user::IdentityProvider>,

        /// [`user::ScmAccount`]s of the [`User`].
        pub scm_accounts: Option<Vec<user::ScmAccount>>,

        /// [`user::Email`] of the [`User`].
        pub email: Option<user::Email>,

        /// [`group::Name`]s of the groups the [`User`] belongs to.
        pub groups: Option<BTreeSet<group::Name>>,

        /// [`user::ExternalLogin`] of the [`User`].
        pub external_login: Option<user::ExternalLogin>,

        /// [`TokenCount`] of the [`User`].
        pub tokens_count: Option<TokenCount>,

        /// [`user::ConnectionDateTime`] of the [`User`].
        pub connected_at: Option<user::ConnectionDateTime>,

        /// Indicator whether the [`User`] is managed by an external system.
        pub managed: Option<bool>,
    }

    impl Record {
        /// Creates a new [`Record`] out of the given [`User`] and its
        /// auxiliary data, exposing only the fields the given [`Visibility`]
        /// grants.
        #[must_use]
        pub fn new(
            user: User,
            visibility: Visibility,
            avatar: Option<user::Avatar>,
            groups: BTreeSet<group::Name>,
            tokens_count: TokenCount,
            managed: bool,
        ) -> Self {
            let Visibility {
                authenticated,
                privileged,
            } = visibility;
            Self {
                avatar: avatar
                    .filter(|_| authenticated && user.email.is_some()),
                active: authenticated.then_some(user.active),
                local: authenticated.then_some(user.local),
                external_provider: authenticated
                    .then_some(user.external_provider)
                    .flatten(),
                scm_accounts: (authenticated && !user.scm_accounts.is_empty())
                    .then_some(user.scm_accounts),
                email: privileged.then_some(user.email).flatten(),
                groups: (privileged && !groups.is_empty()).then_some(groups),
                external_login: privileged
                    .then_some(user.external_login)
                    .flatten(),
                tokens_count: privileged.then_some(tokens_count),
                connected_at: privileged.then_some(user.connected_at).flatten(),
                managed: privileged.then_some(managed),
                login: user.login,
                name: user.name,
            }
        }
    }

    /// Page of [`Record`]s produced by a [`User`]s search.
    pub type Page = common::Page<Record>;

    #[cfg(test)]
    mod spec {
        use super::{Criteria, InvalidCriteria, Selector};

        #[test]
        fn new() {
            assert_eq!(
                Criteria::new(None, None, None, None),
                Ok(Criteria {
                    query: None,
                    deactivated: false,
                    page: 1,
                    page_size: 50,
                }),
            );
            assert_eq!(
                Criteria::new(
                    Some("ab".into()),
                    Some(true),
                    Some(3),
                    Some(500),
                ),
                Ok(Criteria {
                    query: Some("ab".into()),
                    deactivated: true,
                    page: 3,
                    page_size: 500,
                }),
            );
            assert_eq!(
                Criteria::new(Some(String::new()), None, None, None),
                Ok(Criteria::default()),
            );
            assert_eq!(
                Criteria::new(Some("a".into()), None, None, None),
                Err(InvalidCriteria::QueryTooShort),
            );
            assert_eq!(
                Criteria::new(None, None, Some(0), None),
                Err(InvalidCriteria::PageIsNotPositive),
            );
            assert_eq!(
                Criteria::new(None, None, None, Some(0)),
                Err(InvalidCriteria::PageSizeIsNotPositive),
            );
            assert_eq!(
                Criteria::new(None, None, None, Some(501)),
                Err(InvalidCriteria::PageSizeTooLarge),
            );
        }

        #[test]
        fn offset() {
            let mut criteria = Criteria::default();
            assert_eq!(criteria.offset(), 0);

            criteria.page = 3;
            criteria.page_size = 20;
            assert_eq!(criteria.offset(), 40);
        }

        #[test]
        fn from() {
            let criteria = Criteria::new(
                Some("ab".into()),
                Some(true),
                Some(2),
                Some(10),
            )
            .unwrap();
            assert_eq!(
                Selector::from(&criteria),
                Selector {
                    text: Some("ab".into()),
                    active: false,
                    offset: 10,
                    limit: 10,
                },
            );
        }
    }
}
