//! [`Elasticsearch`] search [`Index`] implementation.

use std::time::Duration;

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError, From};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::user,
    infra::{index, Index},
    read::user::search,
};

/// Configuration of an [`Elasticsearch`] client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the node to send requests to.
    pub url: String,

    /// Name of the index holding user documents.
    pub index: String,

    /// Timeout of a single request.
    pub timeout: Duration,
}

/// Elasticsearch search [`Index`] client.
#[derive(Clone, Debug)]
pub struct Elasticsearch {
    /// Configuration of this client.
    config: Config,

    /// HTTP client to perform requests with.
    client: reqwest::Client,
}

impl Elasticsearch {
    /// Maximum length of a text matched by containment, in characters.
    ///
    /// Longer texts must match an indexed field exactly.
    const EXACT_MATCH_THRESHOLD: usize = 15;

    /// Creates a new [`Elasticsearch`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create the underlying HTTP client.
    pub fn new(config: Config) -> Result<Self, Traced<index::Error>> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { config, client })
    }

    /// Builds a search request body selecting the window described by the
    /// given [`search::Selector`].
    fn request_body(selector: &search::Selector) -> serde_json::Value {
        let mut bool_query = json!({
            "filter": [{"term": {"active": selector.active}}],
        });
        if let Some(text) = &selector.text {
            bool_query["must"] = json!([Self::text_clause(text)]);
        }
        json!({
            "query": {"bool": bool_query},
            "_source": ["login"],
            "sort": ["_score", {"login": "asc"}],
            "from": selector.offset,
            "size": selector.limit,
            "track_total_hits": true,
        })
    }

    /// Builds the matching clause for the given search `text`.
    fn text_clause(text: &str) -> serde_json::Value {
        if text.chars().count() > Self::EXACT_MATCH_THRESHOLD {
            json!({
                "bool": {
                    "should": [
                        {"term": {"login": text}},
                        {"term": {"name": text}},
                        {"term": {"email": text}},
                    ],
                },
            })
        } else {
            json!({
                "multi_match": {
                    "query": text,
                    "fields": ["login", "name", "email"],
                    "operator": "and",
                },
            })
        }
    }
}

impl Index<Select<By<search::Hits, search::Selector>>> for Elasticsearch {
    type Ok = search::Hits;
    type Err = Traced<index::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<search::Hits, search::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();

        let url = format!(
            "{}/{}/_search",
            self.config.url.trim_end_matches('/'),
            self.config.index,
        );
        let response = self
            .client
            .post(url)
            .json(&Self::request_body(&selector))
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        if !response.status().is_success() {
            return Err(tracerr::new!(index::Error::from(Error::BadStatus(
                response.status(),
            ))));
        }

        let response = response
            .json::<SearchResponse>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(search::Hits {
            logins: response
                .hits
                .hits
                .into_iter()
                .map(Hit::into_login)
                .collect(),
            total: response.hits.total.value,
        })
    }
}

/// [`Elasticsearch`] client error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Failed to perform an HTTP request.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Response arrived with a non-success status.
    #[display("Unexpected response status: {_0}")]
    #[from(ignore)]
    BadStatus(#[error(not(source))] StatusCode),
}

/// Envelope of an [`Elasticsearch`] search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Hits of the response.
    hits: Hits,
}

/// Hits of a [`SearchResponse`].
#[derive(Debug, Deserialize)]
struct Hits {
    /// Total number of matching documents.
    total: Total,

    /// Documents of the selected window.
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Total hit count of a [`SearchResponse`].
#[derive(Debug, Deserialize)]
struct Total {
    /// Value of the count.
    value: u64,
}

/// Single document hit of a [`SearchResponse`].
#[derive(Debug, Deserialize)]
struct Hit {
    /// Source fields of the document.
    #[serde(rename = "_source")]
    source: Source,
}

impl Hit {
    /// Extracts the [`user::Login`] of this [`Hit`].
    #[expect(unsafe_code, reason = "invariants are preserved")]
    fn into_login(self) -> user::Login {
        // SAFETY: Indexed documents hold logins of existing store records.
        unsafe { user::Login::new_unchecked(self.source.login) }
    }
}

/// `_source` fields of a [`Hit`].
#[derive(Debug, Deserialize)]
struct Source {
    /// Login of the indexed user.
    login: String,
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use crate::{domain::user, read::user::search};

    use super::{Elasticsearch, Hit, SearchResponse};

    #[test]
    fn request_body() {
        assert_eq!(
            Elasticsearch::request_body(&search::Selector {
                text: None,
                active: true,
                offset: 0,
                limit: 50,
            }),
            json!({
                "query": {"bool": {"filter": [{"term": {"active": true}}]}},
                "_source": ["login"],
                "sort": ["_score", {"login": "asc"}],
                "from": 0,
                "size": 50,
                "track_total_hits": true,
            }),
        );

        assert_eq!(
            Elasticsearch::request_body(&search::Selector {
                text: Some("ali".into()),
                active: false,
                offset: 100,
                limit: 20,
            }),
            json!({
                "query": {"bool": {
                    "filter": [{"term": {"active": false}}],
                    "must": [{"multi_match": {
                        "query": "ali",
                        "fields": ["login", "name", "email"],
                        "operator": "and",
                    }}],
                }},
                "_source": ["login"],
                "sort": ["_score", {"login": "asc"}],
                "from": 100,
                "size": 20,
                "track_total_hits": true,
            }),
        );
    }

    #[test]
    fn text_clause() {
        assert_eq!(
            Elasticsearch::text_clause("short"),
            json!({"multi_match": {
                "query": "short",
                "fields": ["login", "name", "email"],
                "operator": "and",
            }}),
        );
        assert_eq!(
            Elasticsearch::text_clause("exactly-15-char"),
            json!({"multi_match": {
                "query": "exactly-15-char",
                "fields": ["login", "name", "email"],
                "operator": "and",
            }}),
        );
        assert_eq!(
            Elasticsearch::text_clause("alice@example.com"),
            json!({"bool": {"should": [
                {"term": {"login": "alice@example.com"}},
                {"term": {"name": "alice@example.com"}},
                {"term": {"email": "alice@example.com"}},
            ]}}),
        );
    }

    #[test]
    fn parses_response() {
        let response = serde_json::from_value::<SearchResponse>(json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": {"value": 5, "relation": "eq"},
                "max_score": 1.2,
                "hits": [
                    {"_index": "users", "_id": "u1", "_score": 1.2,
                     "_source": {"login": "alice"}},
                    {"_index": "users", "_id": "u2", "_score": 1.0,
                     "_source": {"login": "bob"}},
                ],
            },
        }))
        .unwrap();

        assert_eq!(response.hits.total.value, 5);
        assert_eq!(
            response
                .hits
                .hits
                .into_iter()
                .map(Hit::into_login)
                .collect::<Vec<_>>(),
            vec![
                "alice".parse::<user::Login>().unwrap(),
                "bob".parse().unwrap(),
            ],
        );
    }
}
