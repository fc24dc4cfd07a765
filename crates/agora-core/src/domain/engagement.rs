//! Engagement values - likes and dislikes between users and posts.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Polarity of an engagement relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// The relation that must not coexist with this one.
    pub fn opposite(self) -> Self {
        match self {
            Reaction::Like => Reaction::Dislike,
            Reaction::Dislike => Reaction::Like,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Like and dislike tallies for a single post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub likes: u64,
    pub dislikes: u64,
}

/// Result of toggling a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub post_id: Uuid,
    pub reaction: Reaction,
    /// Whether the actor holds the reaction after the toggle.
    pub active: bool,
    /// Number of users holding `reaction` on the post after the toggle.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for reaction in [Reaction::Like, Reaction::Dislike] {
            assert_ne!(reaction.opposite(), reaction);
            assert_eq!(reaction.opposite().opposite(), reaction);
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Reaction::Like.to_string(), "like");
        assert_eq!(Reaction::Dislike.to_string(), "dislike");
    }
}
