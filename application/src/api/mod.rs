//! REST API definitions.

pub mod user;
