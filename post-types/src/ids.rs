//! Identity types for posts and their authors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a post.
///
/// Assigned by the remote source; unique and stable. Ordering follows the
/// numeric value, which is the order every list view presents posts in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Create a PostId from its numeric value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the numeric value.
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostId({})", self.0)
    }
}

/// Identifier of the user who wrote a post (`userId` on the wire).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(i64);

impl AuthorId {
    /// Create an AuthorId from its numeric value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the numeric value.
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for AuthorId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorId({})", self.0)
    }
}
