//! # Tag aggregation
//!
//! Collapses `(post, tag, count)` rows into one `TagCounts` map per post.

use std::collections::{btree_map, HashMap};

use crate::models::{PostId, ReactionTag, TagCounts};

/// Groups tag rows by post. Posts without any tag row are absent from the
/// result; use [`tags_for`] to read it.
///
/// The store keeps `(post, tag)` unique. Should a pair still repeat, the
/// first count seen wins.
pub fn aggregate<I>(rows: I) -> HashMap<PostId, TagCounts>
where
    I: IntoIterator<Item = ReactionTag>,
{
    let mut by_post: HashMap<PostId, TagCounts> = HashMap::new();

    for row in rows {
        let counts = by_post.entry(row.post_id).or_default();
        match counts.entry(row.tag) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(row.count);
            }
            btree_map::Entry::Occupied(slot) => {
                log::debug!(
                    "ignoring duplicate tag {:?} for post {} (count {})",
                    slot.key(),
                    row.post_id,
                    row.count
                );
            }
        }
    }

    by_post
}

/// Removes and returns the tags of `post_id`, or an empty map.
pub fn take_tags(map: &mut HashMap<PostId, TagCounts>, post_id: PostId) -> TagCounts {
    map.remove(&post_id).unwrap_or_default()
}

/// The tags of `post_id`, or an empty map.
pub fn tags_for(map: &HashMap<PostId, TagCounts>, post_id: PostId) -> TagCounts {
    map.get(&post_id).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(post_id: PostId, tag: &str, count: i64) -> ReactionTag {
        ReactionTag { post_id, tag: tag.to_string(), count }
    }

    #[test]
    fn groups_rows_by_post() {
        let map = aggregate([tag(1, "lol", 3), tag(2, "inf", 1), tag(1, "tag", 2)]);

        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], TagCounts::from([("lol".into(), 3), ("tag".into(), 2)]));
        assert_eq!(map[&2], TagCounts::from([("inf".into(), 1)]));
    }

    #[test]
    fn posts_without_tags_read_as_empty() {
        let map = aggregate([tag(1, "lol", 3)]);
        assert!(!map.contains_key(&9));
        assert!(tags_for(&map, 9).is_empty());
    }

    #[test]
    fn duplicate_pairs_keep_the_first_count() {
        let map = aggregate([tag(1, "lol", 3), tag(1, "lol", 8)]);
        assert_eq!(map[&1]["lol"], 3);
    }

    #[test]
    fn take_tags_empties_the_slot() {
        let mut map = aggregate([tag(4, "wtf", 1)]);
        assert_eq!(take_tags(&mut map, 4).len(), 1);
        assert!(take_tags(&mut map, 4).is_empty());
        assert!(aggregate(Vec::new()).is_empty());
    }
}
