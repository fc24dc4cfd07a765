use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engagement::ReactionCounts;

/// Post entity - a short text owned by exactly one author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Author of the post.
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post.
    pub fn new(user_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Replace the content and bump `updated_at`.
    pub fn edit(&mut self, content: String) {
        self.content = content;
        self.updated_at = Utc::now();
    }
}

/// A post with its current like/dislike tallies.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub counts: ReactionCounts,
}

/// Offset/limit window over the post listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 20;
    pub const MAX_LIMIT: u64 = 100;
    /// SQL `OFFSET` is a signed 64-bit value.
    pub const MAX_OFFSET: u64 = i64::MAX as u64;

    /// Build a window from optional query values, clamping the limit to `1..=MAX_LIMIT`
    /// and the offset to `MAX_OFFSET`.
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            offset: offset.unwrap_or(0).min(Self::MAX_OFFSET),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = Pagination::default();
        assert_eq!(page.offset, 0);
        assert_eq!(page.limit, Pagination::DEFAULT_LIMIT);
    }

    #[test]
    fn test_pagination_clamps_limit() {
        assert_eq!(Pagination::new(Some(5), Some(0)).limit, 1);
        assert_eq!(Pagination::new(None, Some(10_000)).limit, Pagination::MAX_LIMIT);
        assert_eq!(Pagination::new(Some(5), Some(7)), Pagination { offset: 5, limit: 7 });
    }

    #[test]
    fn test_pagination_clamps_offset() {
        assert_eq!(Pagination::new(Some(u64::MAX), None).offset, i64::MAX as u64);
        assert_eq!(
            Pagination::new(Some(Pagination::MAX_OFFSET), None).offset,
            Pagination::MAX_OFFSET
        );
        assert_eq!(Pagination::new(Some(40), None).offset, 40);
    }

    #[test]
    fn test_edit_bumps_updated_at() {
        let mut post = Post::new(Uuid::new_v4(), "first".to_string());
        let created = post.updated_at;
        post.edit("second".to_string());
        assert_eq!(post.content, "second");
        assert!(post.updated_at >= created);
        assert_eq!(post.created_at, created);
    }
}
