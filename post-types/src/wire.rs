//! JSON wire shape of the remote `/posts` endpoints.
//!
//! `GET /posts` returns an array of these objects, `GET /posts/{id}` a single
//! one. Unknown fields are ignored; every listed field is required.

use crate::ids::{AuthorId, PostId};
use crate::post::Post;
use serde::{Deserialize, Serialize};

/// A post as served by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDto {
    /// Post id.
    pub id: i64,
    /// Author id.
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
}

impl From<PostDto> for Post {
    fn from(dto: PostDto) -> Self {
        Post {
            id: PostId::new(dto.id),
            author_id: AuthorId::new(dto.user_id),
            title: dto.title,
            body: dto.body,
        }
    }
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        PostDto {
            id: post.id.value(),
            user_id: post.author_id.value(),
            title: post.title.clone(),
            body: post.body.clone(),
        }
    }
}
