//! # post-types
//!
//! Domain and wire types shared by every postview crate.
//!
//! - [`PostId`], [`AuthorId`] - Identity types assigned by the remote source
//! - [`Post`] - The immutable domain entity shown to the user
//! - [`PostDto`] - JSON shape served by the remote `/posts` endpoints

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ids;
mod post;
mod wire;

pub use ids::{AuthorId, PostId};
pub use post::Post;
pub use wire::PostDto;
