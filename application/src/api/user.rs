//! [`User`]-related API definitions.

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use service::{query, read::user::search, Query as _};

use crate::{AsError, Context, Error};

/// Handles a [`User`]s search HTTP request.
///
/// # Errors
///
/// - If the request parameters are malformed or violate their bounds.
/// - If the search cannot be executed.
#[tracing::instrument(skip_all)]
pub async fn search(
    ctx: Context,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResult>, Error> {
    let Query(params) = params.map_err(AsError::into_error)?;
    let SearchParams {
        query,
        deactivated,
        page,
        page_size,
    } = params;

    let criteria = search::Criteria::new(query, deactivated, page, page_size)
        .map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::users::Search {
            criteria,
            session: ctx.session(),
        })
        .await
        .map_err(AsError::into_error)
        .map(|page| Json(page.into()))
}

/// Parameters of a [`User`]s search HTTP request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchParams {
    /// Text to search [`User`]s by.
    pub query: Option<String>,

    /// Indicator whether deactivated [`User`]s are searched instead of
    /// active ones.
    pub deactivated: Option<bool>,

    /// 1-based index of the requested page.
    pub page: Option<u32>,

    /// Number of [`User`]s forming the requested page.
    pub page_size: Option<u32>,
}

/// Page of [`User`]s assembled by a search.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SearchResult {
    /// [`User`]s forming the requested page, in the search index's ranking
    /// order.
    pub users: Vec<User>,

    /// [`Paging`] of the page.
    pub paging: Paging,
}

impl From<search::Page> for SearchResult {
    fn from(page: search::Page) -> Self {
        Self {
            users: page.nodes.into_iter().map(Into::into).collect(),
            paging: page.paging.into(),
        }
    }
}

/// Single [`User`] entry of a [`SearchResult`].
///
/// Every field beyond `login` and `name` appears only when the caller's
/// visibility grants it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Login of this [`User`].
    pub login: String,

    /// Name of this [`User`].
    pub name: String,

    /// Avatar of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Indicator whether this [`User`] is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Indicator whether this [`User`] authenticates locally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<bool>,

    /// Name of the identity provider this [`User`] authenticates through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_provider: Option<String>,

    /// SCM accounts of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scm_accounts: Option<Vec<String>>,

    /// Email of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Names of the groups this [`User`] belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,

    /// Login of this [`User`] at its identity provider.
    #[serde(
        rename = "externalIdentity",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_login: Option<String>,

    /// Number of access tokens of this [`User`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_count: Option<i32>,

    /// [RFC 3339] date and time this [`User`] connected last time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[serde(
        rename = "lastConnectionDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub connected_at: Option<String>,

    /// Indicator whether this [`User`] is managed by an external system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
}

impl From<search::Record> for User {
    fn from(record: search::Record) -> Self {
        let search::Record {
            login,
            name,
            avatar,
            active,
            local,
            external_provider,
            scm_accounts,
            email,
            groups,
            external_login,
            tokens_count,
            connected_at,
            managed,
        } = record;
        Self {
            login: login.to_string(),
            name: name.to_string(),
            avatar: avatar.map(|a| a.to_string()),
            active,
            local,
            external_provider: external_provider.map(|p| p.to_string()),
            scm_accounts: scm_accounts.map(|accounts| {
                accounts.into_iter().map(|a| a.to_string()).collect()
            }),
            email: email.map(|e| e.to_string()),
            groups: groups.map(|groups| {
                groups.into_iter().map(|g| g.to_string()).collect()
            }),
            external_login: external_login.map(|l| l.to_string()),
            tokens_count: tokens_count.map(Into::into),
            connected_at: connected_at.map(|dt| dt.to_rfc3339()),
            managed,
        }
    }
}

/// Paging of a [`SearchResult`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// 1-based index of the page.
    pub page_index: u32,

    /// Maximum number of [`User`]s the page may hold.
    pub page_size: u32,

    /// Total number of [`User`]s matching the search, as reported by the
    /// search index.
    pub total: u64,
}

impl From<common::Paging> for Paging {
    fn from(paging: common::Paging) -> Self {
        let common::Paging {
            page_index,
            page_size,
            total,
        } = paging;
        Self {
            page_index,
            page_size,
            total,
        }
    }
}

impl AsError for search::InvalidCriteria {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "INVALID_ARGUMENT",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for query::users::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Index(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use serde_json::json;
    use service::read::user::search;

    use crate::AsError as _;

    use super::{Paging, SearchParams, SearchResult, User};

    fn minimal() -> User {
        User {
            login: "alice".into(),
            name: "Alice".into(),
            avatar: None,
            active: None,
            local: None,
            external_provider: None,
            scm_accounts: None,
            email: None,
            groups: None,
            external_login: None,
            tokens_count: None,
            connected_at: None,
            managed: None,
        }
    }

    #[test]
    fn hides_ungranted_fields() {
        assert_eq!(
            serde_json::to_value(minimal()).unwrap(),
            json!({"login": "alice", "name": "Alice"}),
        );
    }

    #[test]
    fn serializes_granted_fields() {
        let user = User {
            avatar: Some("a1b2".into()),
            active: Some(true),
            local: Some(false),
            external_provider: Some("github".into()),
            scm_accounts: Some(vec!["alice-scm".into()]),
            email: Some("alice@example.com".into()),
            groups: Some(vec!["admins".into(), "devs".into()]),
            external_login: Some("alice-gh".into()),
            tokens_count: Some(3),
            connected_at: Some("2024-05-17T10:23:54Z".into()),
            managed: Some(true),
            ..minimal()
        };

        assert_eq!(
            serde_json::to_value(user).unwrap(),
            json!({
                "login": "alice",
                "name": "Alice",
                "avatar": "a1b2",
                "active": true,
                "local": false,
                "externalProvider": "github",
                "scmAccounts": ["alice-scm"],
                "email": "alice@example.com",
                "groups": ["admins", "devs"],
                "externalIdentity": "alice-gh",
                "tokensCount": 3,
                "lastConnectionDate": "2024-05-17T10:23:54Z",
                "managed": true,
            }),
        );
    }

    #[test]
    fn shapes_search_page() {
        let record = search::Record {
            login: "alice".parse().unwrap(),
            name: "Alice".parse().unwrap(),
            avatar: None,
            active: Some(true),
            local: Some(true),
            external_provider: None,
            scm_accounts: None,
            email: Some("alice@example.com".parse().unwrap()),
            groups: Some(["admins".parse().unwrap()].into()),
            external_login: None,
            tokens_count: Some(3.into()),
            connected_at: Some(
                DateTime::from_unix_timestamp(1_715_941_434)
                    .unwrap()
                    .coerce(),
            ),
            managed: Some(false),
        };
        let page = search::Page {
            nodes: vec![record],
            paging: common::Paging::new(1, 50, 5),
        };

        let result = SearchResult::from(page);

        assert_eq!(
            result.paging,
            Paging {
                page_index: 1,
                page_size: 50,
                total: 5,
            },
        );
        let user = &result.users[0];
        assert_eq!(user.login, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.groups, Some(vec!["admins".to_owned()]));
        assert_eq!(user.tokens_count, Some(3));
        assert_eq!(
            user.connected_at.as_deref(),
            Some("2024-05-17T10:23:54Z"),
        );
    }

    #[test]
    fn deserializes_params() {
        assert_eq!(
            serde_json::from_value::<SearchParams>(json!({
                "query": "ab",
                "deactivated": true,
                "page": 2,
                "pageSize": 100,
            }))
            .unwrap(),
            SearchParams {
                query: Some("ab".into()),
                deactivated: Some(true),
                page: Some(2),
                page_size: Some(100),
            },
        );
        assert_eq!(
            serde_json::from_value::<SearchParams>(json!({})).unwrap(),
            SearchParams::default(),
        );
    }

    #[test]
    fn maps_invalid_criteria() {
        let err = search::Criteria::new(None, None, None, Some(501))
            .unwrap_err()
            .into_error();

        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("500"));
    }
}
