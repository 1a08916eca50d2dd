//! The post domain entity.

use crate::ids::{AuthorId, PostId};
use serde::{Deserialize, Serialize};

/// A post as presented to the user.
///
/// Immutable value with no local-only fields. Identity is [`Post::id`]: two
/// posts with the same id describe the same record, the later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier assigned by the remote source.
    pub id: PostId,
    /// The user who wrote the post.
    pub author_id: AuthorId,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
}

impl Post {
    /// Create a new post.
    pub fn new(
        id: impl Into<PostId>,
        author_id: impl Into<AuthorId>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}
