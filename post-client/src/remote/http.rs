//! HTTP remote source.
//!
//! Talks to a JSON API exposing:
//! - `GET {base}/posts` - array of `{id, userId, title, body}`
//! - `GET {base}/posts/{id}` - a single object of the same shape

use super::{RemoteError, RemoteResult, RemoteSource};
use crate::config::RemoteConfig;
use async_trait::async_trait;
use post_types::{Post, PostDto, PostId};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Instant;

/// Remote source backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRemoteSource {
    /// Build a source from configuration.
    ///
    /// Fails if the base URL does not parse.
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| RemoteError::Request(format!("invalid base url {base}: {e}")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.socket_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RemoteError::Request(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Base endpoint every path is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::Request(format!("invalid path {path}: {e}")))
    }

    /// GET `url` and decode the body. A 404 maps to `NotFound` when `id` is set.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, id: Option<PostId>) -> RemoteResult<T> {
        let started = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("GET {} failed after {:?}: {}", url, started.elapsed(), e);
                return Err(e.into());
            }
        };

        let status = response.status();
        tracing::debug!("GET {} -> {} in {:?}", url, status, started.elapsed());

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => return Err(RemoteError::NotFound { id }),
            (status, _) if !status.is_success() => {
                return Err(RemoteError::Status {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_all(&self) -> RemoteResult<Vec<Post>> {
        let url = self.endpoint("posts")?;
        let posts: Vec<PostDto> = self.get_json(url, None).await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn fetch_by_id(&self, id: PostId) -> RemoteResult<Post> {
        let url = self.endpoint(&format!("posts/{id}"))?;
        let post: PostDto = self.get_json(url, Some(id)).await?;
        Ok(post.into())
    }
}
