//! Marker types.

/// Marker type describing an entity connection.
#[derive(Clone, Copy, Debug)]
pub struct Connection;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
