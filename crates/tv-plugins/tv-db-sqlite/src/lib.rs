//! # tv-db-sqlite Implementation
//!
//! Maps the SQLite tables `posts` and `post_tags` onto the `tv-core` domain
//! models. Read-only: the schema and the write path belong to whatever
//! fills the database.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tv_core::models::{AuthorQuery, Post, PostId, ReactionTag};
use tv_core::traits::PostRepo;

/// Root post plus everything hanging below it in the same thread.
/// `UNION` (not `UNION ALL`) so that cyclic parent links terminate.
const HIERARCHY_SQL: &str = r#"
    WITH RECURSIVE thread(id, parent_id, thread_id, author, posted_at, body) AS (
        SELECT id, parent_id, thread_id, author, posted_at, body
        FROM posts
        WHERE id = ?1

        UNION

        SELECT p.id, p.parent_id, p.thread_id, p.author, p.posted_at, p.body
        FROM posts p
        JOIN thread t ON p.parent_id = t.id
        WHERE p.thread_id = t.thread_id
    )
    SELECT id, parent_id, thread_id, author, posted_at, body FROM thread
"#;

const SEARCH_SQL: &str = r#"
    SELECT id, parent_id, thread_id, author, posted_at, body
    FROM posts
    WHERE author LIKE ?1
    ORDER BY posted_at DESC, id DESC
    LIMIT ?2 OFFSET ?3
"#;

/// Posts lacking the rank tag join to NULL and rank as zero.
const RANKED_SEARCH_SQL: &str = r#"
    SELECT p.id, p.parent_id, p.thread_id, p.author, p.posted_at, p.body
    FROM posts p
    LEFT JOIN post_tags t ON t.post_id = p.id AND t.tag = ?2
    WHERE p.author LIKE ?1
    ORDER BY COALESCE(t.count, 0) DESC, p.posted_at DESC, p.id DESC
    LIMIT ?3 OFFSET ?4
"#;

const COUNT_SQL: &str = "SELECT COUNT(*) FROM posts WHERE author LIKE ?1";

#[derive(FromRow)]
struct PostRecord {
    id: i64,
    parent_id: Option<i64>,
    thread_id: i64,
    author: String,
    posted_at: DateTime<Utc>,
    body: String,
}

impl From<PostRecord> for Post {
    fn from(r: PostRecord) -> Self {
        Post {
            id: r.id,
            parent_id: r.parent_id,
            thread_id: r.thread_id,
            author: r.author,
            posted_at: r.posted_at,
            body: r.body,
        }
    }
}

#[derive(FromRow)]
struct TagRecord {
    post_id: i64,
    tag: String,
    count: i64,
}

impl From<TagRecord> for ReactionTag {
    fn from(r: TagRecord) -> Self {
        ReactionTag {
            post_id: r.post_id,
            tag: r.tag,
            count: r.count,
        }
    }
}

pub struct SqlitePostRepo {
    pool: SqlitePool,
}

impl SqlitePostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool on `url`. Waiting for a free connection longer than
    /// `acquire_timeout` fails the query instead of hanging the caller.
    pub async fn connect(url: &str, max_connections: u32, acquire_timeout: Duration) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .context("opening SQLite database")?;
        log::info!("connected to SQLite ({max_connections} connections max)");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PostRepo for SqlitePostRepo {
    async fn fetch_hierarchy(&self, root_id: PostId) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRecord>(HIERARCHY_SQL)
            .bind(root_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("fetching thread below post {root_id}"))?;
        log::debug!("hierarchy of {root_id}: {} rows", rows.len());
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn fetch_tags(&self, post_ids: &[PostId]) -> anyhow::Result<Vec<ReactionTag>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT post_id, tag, count FROM post_tags WHERE post_id IN (");
        let mut ids = qb.separated(", ");
        for id in post_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");

        let rows = qb
            .build_query_as::<TagRecord>()
            .fetch_all(&self.pool)
            .await
            .context("fetching reaction tags")?;
        Ok(rows.into_iter().map(ReactionTag::from).collect())
    }

    async fn search_by_author(&self, query: &AuthorQuery) -> anyhow::Result<Vec<Post>> {
        let rows = match &query.rank_tag {
            Some(tag) => {
                sqlx::query_as::<_, PostRecord>(RANKED_SEARCH_SQL)
                    .bind(&query.author)
                    .bind(tag)
                    .bind(query.limit)
                    .bind(query.offset)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as::<_, PostRecord>(SEARCH_SQL)
                    .bind(&query.author)
                    .bind(query.limit)
                    .bind(query.offset)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .with_context(|| format!("searching posts by {:?}", query.author))?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn count_by_author(&self, author: &str) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(COUNT_SQL)
            .bind(author)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("counting posts by {author:?}"))?;
        Ok(count)
    }
}
