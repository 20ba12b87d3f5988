//! In-memory `PostRepo` for tests in this and downstream crates.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{AuthorQuery, Post, PostId, ReactionTag};
use crate::traits::PostRepo;

/// Builds a post whose timestamp is `secs` seconds after the Unix epoch.
pub fn post(id: PostId, parent_id: Option<PostId>, thread_id: i64, author: &str, secs: i64, body: &str) -> Post {
    Post {
        id,
        parent_id,
        thread_id,
        author: author.to_string(),
        posted_at: DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default(),
        body: body.to_string(),
    }
}

pub fn tag(post_id: PostId, tag: &str, count: i64) -> ReactionTag {
    ReactionTag {
        post_id,
        tag: tag.to_string(),
        count,
    }
}

/// A store held in two vectors.
///
/// `fetch_hierarchy` hands back the root's whole thread, reachable or not,
/// so callers must do their own tree walk. Author matching is ASCII
/// case-insensitive equality.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    pub posts: Vec<Post>,
    pub tags: Vec<ReactionTag>,
}

impl MemoryRepo {
    pub fn new(posts: Vec<Post>, tags: Vec<ReactionTag>) -> Self {
        Self { posts, tags }
    }

    fn tag_count(&self, post_id: PostId, tag: &str) -> i64 {
        self.tags
            .iter()
            .find(|t| t.post_id == post_id && t.tag == tag)
            .map_or(0, |t| t.count)
    }

    fn by_author<'a>(&'a self, author: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts
            .iter()
            .filter(move |p| p.author.eq_ignore_ascii_case(author))
    }
}

#[async_trait]
impl PostRepo for MemoryRepo {
    async fn fetch_hierarchy(&self, root_id: PostId) -> anyhow::Result<Vec<Post>> {
        let Some(root) = self.posts.iter().find(|p| p.id == root_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .posts
            .iter()
            .filter(|p| p.thread_id == root.thread_id)
            .cloned()
            .collect())
    }

    async fn fetch_tags(&self, post_ids: &[PostId]) -> anyhow::Result<Vec<ReactionTag>> {
        Ok(self
            .tags
            .iter()
            .filter(|t| post_ids.contains(&t.post_id))
            .cloned()
            .collect())
    }

    async fn search_by_author(&self, query: &AuthorQuery) -> anyhow::Result<Vec<Post>> {
        let mut hits: Vec<&Post> = self.by_author(&query.author).collect();
        hits.sort_by(|a, b| {
            let rank = match &query.rank_tag {
                Some(t) => self.tag_count(b.id, t).cmp(&self.tag_count(a.id, t)),
                None => Ordering::Equal,
            };
            rank.then(b.posted_at.cmp(&a.posted_at))
                .then(b.id.cmp(&a.id))
        });

        Ok(hits
            .into_iter()
            .skip(usize::try_from(query.offset)?)
            .take(usize::try_from(query.limit)?)
            .cloned()
            .collect())
    }

    async fn count_by_author(&self, author: &str) -> anyhow::Result<i64> {
        Ok(i64::try_from(self.by_author(author).count())?)
    }
}
