//! Domain definitions.

pub mod group;
pub mod user;

pub use self::user::User;
