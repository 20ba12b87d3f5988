//! # Thread assembly
//!
//! Turns the flat rows of one conversation into display order: every post
//! right after its parent and before its younger siblings, each with its
//! depth, sanitized body, brightness and reaction tags.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::brightness::{TimeRange, MAX_BRIGHTNESS};
use crate::error::{AppError, Result};
use crate::models::{Post, PostId, ThreadRow};
use crate::sanitize::Sanitizer;
use crate::tags;
use crate::traits::PostRepo;

/// A post placed in the tree below the requested root.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadNode {
    pub post: Post,
    pub depth: u32,
    pub path: Vec<PostId>,
}

/// Walks the tree hanging below `root_id` and returns its nodes sorted by
/// path, i.e. in pre-order with siblings by ascending id.
///
/// Only posts reachable from the root through parent links and carrying the
/// root's thread id are kept; anything else in `posts` is ignored. Returns
/// `None` when `root_id` is not among `posts`.
pub fn order_thread(root_id: PostId, posts: Vec<Post>) -> Option<Vec<ThreadNode>> {
    let mut root = None;
    let mut children: HashMap<PostId, Vec<Post>> = HashMap::new();

    for post in posts {
        if post.id == root_id {
            root = Some(post);
        } else if let Some(parent_id) = post.parent_id {
            children.entry(parent_id).or_default().push(post);
        }
    }

    let root = root?;
    let thread_id = root.thread_id;
    let mut seen = HashSet::from([root_id]);
    let mut stack = vec![ThreadNode {
        post: root,
        depth: 0,
        path: vec![root_id],
    }];
    let mut placed = Vec::new();

    while let Some(node) = stack.pop() {
        for child in children.remove(&node.post.id).unwrap_or_default() {
            if child.thread_id != thread_id || !seen.insert(child.id) {
                continue;
            }
            let mut path = node.path.clone();
            path.push(child.id);
            stack.push(ThreadNode {
                post: child,
                depth: node.depth + 1,
                path,
            });
        }
        placed.push(node);
    }

    placed.sort_by(|a, b| a.path.cmp(&b.path));
    Some(placed)
}

/// Builds display-ready threads from a [`PostRepo`].
pub struct ThreadAssembler {
    repo: Arc<dyn PostRepo>,
    sanitizer: Arc<Sanitizer>,
}

impl ThreadAssembler {
    pub fn new(repo: Arc<dyn PostRepo>, sanitizer: Arc<Sanitizer>) -> Self {
        Self { repo, sanitizer }
    }

    /// Assembles the thread rooted at `root_id`.
    ///
    /// The root keeps its line breaks; replies are shown condensed, without
    /// them. Brightness is relative to the posts of this thread only.
    pub async fn assemble(&self, root_id: PostId) -> Result<Vec<ThreadRow>> {
        let posts = self
            .repo
            .fetch_hierarchy(root_id)
            .await
            .map_err(AppError::store)?;

        let nodes = order_thread(root_id, posts)
            .ok_or_else(|| AppError::NotFound("post".to_string(), root_id.to_string()))?;

        let ids: Vec<PostId> = nodes.iter().map(|n| n.post.id).collect();
        let tag_rows = self.repo.fetch_tags(&ids).await.map_err(AppError::store)?;
        let mut tag_map = tags::aggregate(tag_rows);

        let range = TimeRange::of(nodes.iter().map(|n| n.post.posted_at));
        log::debug!("assembled thread {root_id}: {} posts", nodes.len());

        let rows = nodes
            .into_iter()
            .enumerate()
            .map(|(i, ThreadNode { post, depth, path })| ThreadRow {
                body: self.sanitizer.sanitize(&post.body, i > 0, false),
                brightness: range.map_or(MAX_BRIGHTNESS, |r| r.brightness(post.posted_at)),
                tags: tags::take_tags(&mut tag_map, post.id),
                id: post.id,
                parent_id: post.parent_id,
                thread_id: post.thread_id,
                author: post.author,
                posted_at: post.posted_at,
                depth,
                path,
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, tag, MemoryRepo};
    use crate::traits::MockPostRepo;

    fn ids(nodes: &[ThreadNode]) -> Vec<PostId> {
        nodes.iter().map(|n| n.post.id).collect()
    }

    fn assembler(repo: impl PostRepo + 'static) -> ThreadAssembler {
        ThreadAssembler::new(Arc::new(repo), Arc::new(Sanitizer::default()))
    }

    #[test]
    fn orders_depth_first() {
        let posts = vec![
            post(3, Some(1), 1, "c", 30, ""),
            post(4, Some(2), 1, "d", 40, ""),
            post(1, None, 1, "a", 10, ""),
            post(2, Some(1), 1, "b", 20, ""),
        ];

        let nodes = order_thread(1, posts).unwrap();

        assert_eq!(ids(&nodes), vec![1, 2, 4, 3]);
        let depths: Vec<u32> = nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
        assert_eq!(nodes[2].path, vec![1, 2, 4]);
    }

    #[test]
    fn siblings_follow_id_order() {
        let posts = vec![
            post(10, None, 1, "a", 0, ""),
            post(30, Some(10), 1, "a", 1, ""),
            post(20, Some(10), 1, "a", 2, ""),
            post(25, Some(20), 1, "a", 3, ""),
        ];
        assert_eq!(ids(&order_thread(10, posts).unwrap()), vec![10, 20, 25, 30]);
    }

    #[test]
    fn every_row_extends_an_earlier_row() {
        let posts = vec![
            post(1, None, 1, "a", 0, ""),
            post(2, Some(1), 1, "a", 1, ""),
            post(3, Some(2), 1, "a", 2, ""),
            post(4, Some(3), 1, "a", 3, ""),
            post(5, Some(1), 1, "a", 4, ""),
            post(6, Some(5), 1, "a", 5, ""),
            post(7, Some(2), 1, "a", 6, ""),
        ];
        let nodes = order_thread(1, posts).unwrap();

        for (i, node) in nodes.iter().enumerate().skip(1) {
            let parent_path = &node.path[..node.path.len() - 1];
            let parent = nodes[..i].iter().rposition(|n| n.path == parent_path);
            assert!(parent.is_some(), "parent of {} not listed before it", node.post.id);
            // Once a subtree is left, it is never re-entered.
            assert!(nodes[parent.unwrap() + 1..i]
                .iter()
                .all(|n| n.path.starts_with(parent_path)));
            assert!(node.depth <= nodes[i - 1].depth + 1);
        }
    }

    #[test]
    fn unreachable_and_foreign_posts_are_left_out() {
        let posts = vec![
            post(1, None, 1, "a", 0, ""),
            post(2, Some(1), 1, "a", 1, ""),
            // same thread id, but hangs off a post that is not there
            post(5, Some(99), 1, "a", 2, ""),
            // child of the root filed under another thread
            post(6, Some(1), 2, "a", 3, ""),
        ];
        assert_eq!(ids(&order_thread(1, posts).unwrap()), vec![1, 2]);
    }

    #[test]
    fn any_post_can_be_the_root() {
        let posts = vec![
            post(1, None, 1, "a", 0, ""),
            post(2, Some(1), 1, "a", 1, ""),
            post(4, Some(2), 1, "a", 2, ""),
            post(3, Some(1), 1, "a", 3, ""),
        ];
        let nodes = order_thread(2, posts).unwrap();
        assert_eq!(ids(&nodes), vec![2, 4]);
        assert_eq!(nodes[0].depth, 0);
        assert_eq!(nodes[1].path, vec![2, 4]);
    }

    #[test]
    fn cycles_terminate() {
        let posts = vec![
            post(1, Some(3), 1, "a", 0, ""),
            post(2, Some(1), 1, "a", 1, ""),
            post(3, Some(2), 1, "a", 2, ""),
        ];
        assert_eq!(ids(&order_thread(1, posts).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn missing_root_yields_none() {
        assert!(order_thread(1, vec![post(2, Some(1), 1, "a", 0, "")]).is_none());
        assert!(order_thread(1, Vec::new()).is_none());
    }

    #[tokio::test]
    async fn assembles_enriched_rows() {
        let repo = MemoryRepo::new(
            vec![
                post(1, None, 1, "alice", 100, "root<br>line"),
                post(2, Some(1), 1, "bob", 250, r#"reply<br><a href="https://example.com">x</a>"#),
                post(3, Some(1), 1, "carol", 1_000, "<script>evil()</script>late"),
                post(4, Some(2), 1, "dave", 550, "mid"),
            ],
            vec![tag(1, "lol", 2), tag(1, "inf", 1), tag(4, "tag", 5), tag(77, "lol", 9)],
        );

        let rows = assembler(repo).assemble(1).await.unwrap();

        let order: Vec<PostId> = rows.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![1, 2, 4, 3]);

        assert_eq!(rows[0].body, "root<br>line");
        assert_eq!(rows[1].body, r#"reply<a href="https://example.com">x</a>"#);
        assert_eq!(rows[3].body, "late");

        let brightness: Vec<u8> = rows.iter().map(|r| r.brightness).collect();
        assert_eq!(brightness, vec![1, 2, 5, 10]);

        assert_eq!(rows[0].tags.len(), 2);
        assert_eq!(rows[0].tags["lol"], 2);
        assert!(rows[1].tags.is_empty());
        assert_eq!(rows[2].tags["tag"], 5);
    }

    #[tokio::test]
    async fn single_post_thread_is_fully_bright() {
        let repo = MemoryRepo::new(vec![post(9, None, 3, "alice", 42, "only")], Vec::new());
        let rows = assembler(repo).assemble(9).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].brightness, 10);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[0].path, vec![9]);
    }

    #[tokio::test]
    async fn equal_timestamps_are_fully_bright() {
        let repo = MemoryRepo::new(
            vec![post(1, None, 1, "a", 5, ""), post(2, Some(1), 1, "b", 5, "")],
            Vec::new(),
        );
        let rows = assembler(repo).assemble(1).await.unwrap();
        assert!(rows.iter().all(|r| r.brightness == 10));
    }

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let repo = MemoryRepo::new(vec![post(1, None, 1, "a", 0, "")], Vec::new());
        let err = assembler(repo).assemble(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_, ref id) if id == "404"));
    }

    #[tokio::test]
    async fn hierarchy_failure_is_a_store_error() {
        let mut repo = MockPostRepo::new();
        repo.expect_fetch_hierarchy()
            .returning(|_| Err(anyhow::anyhow!("database is locked")));

        let err = assembler(repo).assemble(1).await.unwrap_err();
        assert!(matches!(err, AppError::StoreError(ref msg) if msg.contains("database is locked")));
    }

    #[tokio::test]
    async fn tag_failure_is_a_store_error() {
        let mut repo = MockPostRepo::new();
        repo.expect_fetch_hierarchy()
            .returning(|id| Ok(vec![post(id, None, 1, "a", 0, "")]));
        repo.expect_fetch_tags()
            .returning(|_| Err(anyhow::anyhow!("pool timed out")));

        let err = assembler(repo).assemble(1).await.unwrap_err();
        assert!(matches!(err, AppError::StoreError(_)));
    }
}
