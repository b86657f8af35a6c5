//! Search [`Index`]-related implementations.

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "elasticsearch")]
pub use self::elasticsearch::Elasticsearch;

/// Search index operation.
pub use common::Handler as Index;

/// Search [`Index`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "elasticsearch")]
    /// [`Elasticsearch`] error.
    Elasticsearch(elasticsearch::Error),
}
