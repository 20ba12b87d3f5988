//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::models::{AuthorQuery, Post, PostId, ReactionTag};

/// Read-only access to posts and their reaction tags.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Returns the post `root_id` and every post reachable from it through
    /// parent links within the same thread, in no particular order.
    /// An empty result means the root does not exist.
    async fn fetch_hierarchy(&self, root_id: PostId) -> anyhow::Result<Vec<Post>>;

    /// Returns every tag row attached to any of `post_ids`.
    async fn fetch_tags(&self, post_ids: &[PostId]) -> anyhow::Result<Vec<ReactionTag>>;

    /// Returns one ordered, bounded page of posts matching the author filter.
    async fn search_by_author(&self, query: &AuthorQuery) -> anyhow::Result<Vec<Post>>;

    /// Counts all posts matching the author filter, ignoring paging.
    async fn count_by_author(&self, author: &str) -> anyhow::Result<i64>;
}
