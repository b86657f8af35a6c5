//! Infrastructure layer.

pub mod avatars;
pub mod database;
pub mod index;

pub use self::{
    avatars::{Avatars, EmailHashes},
    database::Database,
    index::Index,
};
#[cfg(feature = "elasticsearch")]
pub use self::index::{elasticsearch, Elasticsearch};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
