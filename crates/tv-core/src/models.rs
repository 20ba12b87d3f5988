//! # Domain Models
//!
//! Rows as they come out of the store (`Post`, `ReactionTag`) and the
//! display-ready records built from them (`ThreadRow`, `SearchRow`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PostId = i64;

/// Reaction counts for one post, keyed by tag name.
pub type TagCounts = BTreeMap<String, i64>;

/// A single forum message, exactly as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// `None` only for the first post of a thread.
    pub parent_id: Option<PostId>,
    pub thread_id: i64,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    /// Raw, untrusted HTML.
    pub body: String,
}

/// A named counter attached to a post (e.g. "lol": 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTag {
    pub post_id: PostId,
    pub tag: String,
    pub count: i64,
}

/// One post of an assembled thread, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadRow {
    pub id: PostId,
    pub parent_id: Option<PostId>,
    pub thread_id: i64,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    /// Sanitized body.
    pub body: String,
    /// Distance from the requested root (root = 0).
    pub depth: u32,
    /// Post ids from the root down to this post.
    pub path: Vec<PostId>,
    /// Recency within the thread, 1 (oldest) to 10 (newest).
    pub brightness: u8,
    pub tags: TagCounts,
}

/// One hit of an author search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub id: PostId,
    pub thread_id: i64,
    pub posted_at: DateTime<Utc>,
    /// Truncated, link-free, sanitized body.
    pub preview: String,
    pub author: String,
    pub tags: TagCounts,
}

/// Caller-supplied search parameters.
///
/// `page` and `page_size` are signed so that out-of-range values coming from
/// the request layer can be rejected instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    pub author: String,
    pub page: i64,
    pub page_size: i64,
    pub rank_tag: Option<String>,
}

/// A bounded author query as handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorQuery {
    pub author: String,
    pub limit: i64,
    pub offset: i64,
    pub rank_tag: Option<String>,
}

/// One page of search results plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub rows: Vec<SearchRow>,
    pub total_count: u64,
    pub page: i64,
    pub page_size: i64,
}

impl SearchPage {
    /// Number of pages needed to show `total_count` rows.
    pub fn total_pages(&self) -> u64 {
        if self.page_size <= 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size as u64)
    }
}
