//! # Author search
//!
//! One page of an author's posts, newest first or ranked by a reaction tag,
//! each shown as a short plain-text preview.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{AuthorQuery, PostId, SearchPage, SearchRequest, SearchRow};
use crate::sanitize::Sanitizer;
use crate::tags;
use crate::traits::PostRepo;

/// Appended to previews cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Limits applied by [`SearchPaginator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    /// Largest `page_size` accepted.
    pub max_page_size: i64,
    /// Characters of the raw body kept in a preview.
    pub preview_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_page_size: 500,
            preview_chars: 100,
        }
    }
}

pub struct SearchPaginator {
    repo: Arc<dyn PostRepo>,
    sanitizer: Arc<Sanitizer>,
    settings: SearchSettings,
}

impl SearchPaginator {
    pub fn new(repo: Arc<dyn PostRepo>, sanitizer: Arc<Sanitizer>, settings: SearchSettings) -> Self {
        Self {
            repo,
            sanitizer,
            settings,
        }
    }

    /// Fetches page `request.page` of the author's posts.
    ///
    /// Parameters are validated here rather than clamped: a blank author, a
    /// page or page size below 1, or a page size above the configured
    /// maximum is a `ValidationError`. No match at all is an empty page.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let query = self.bounded_query(request)?;

        let posts = self
            .repo
            .search_by_author(&query)
            .await
            .map_err(AppError::store)?;
        let total = self
            .repo
            .count_by_author(&query.author)
            .await
            .map_err(AppError::store)?;

        let mut tag_map = if posts.is_empty() {
            HashMap::new()
        } else {
            let ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
            tags::aggregate(self.repo.fetch_tags(&ids).await.map_err(AppError::store)?)
        };

        log::debug!(
            "search {:?} page {}: {} of {} rows",
            query.author,
            request.page,
            posts.len(),
            total
        );

        let rows = posts
            .into_iter()
            .map(|post| SearchRow {
                preview: self.preview(&post.body),
                tags: tags::take_tags(&mut tag_map, post.id),
                id: post.id,
                thread_id: post.thread_id,
                posted_at: post.posted_at,
                author: post.author,
            })
            .collect();

        Ok(SearchPage {
            rows,
            total_count: u64::try_from(total).unwrap_or(0),
            page: request.page,
            page_size: request.page_size,
        })
    }

    /// Plain-text preview of `body`: its first `preview_chars` characters,
    /// sanitized, plus [`TRUNCATION_MARKER`] when the raw body is longer.
    pub fn preview(&self, body: &str) -> String {
        match body.char_indices().nth(self.settings.preview_chars) {
            Some((cut, _)) => {
                let mut preview = self.sanitizer.sanitize(&body[..cut], true, true);
                preview.push_str(TRUNCATION_MARKER);
                preview
            }
            None => self.sanitizer.sanitize(body, true, true),
        }
    }

    fn bounded_query(&self, request: &SearchRequest) -> Result<AuthorQuery> {
        let author = request.author.trim();
        if author.is_empty() {
            return Err(AppError::ValidationError("author must not be blank".into()));
        }
        if request.page < 1 {
            return Err(AppError::ValidationError(format!(
                "page must be at least 1, got {}",
                request.page
            )));
        }
        if request.page_size < 1 || request.page_size > self.settings.max_page_size {
            return Err(AppError::ValidationError(format!(
                "page_size must be between 1 and {}, got {}",
                self.settings.max_page_size, request.page_size
            )));
        }
        let offset = (request.page - 1)
            .checked_mul(request.page_size)
            .ok_or_else(|| AppError::ValidationError(format!("page {} is out of range", request.page)))?;

        Ok(AuthorQuery {
            author: author.to_string(),
            limit: request.page_size,
            offset,
            rank_tag: request.rank_tag.clone().filter(|t| !t.trim().is_empty()),
        })
    }
}
