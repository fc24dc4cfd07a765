//! Domain entities - the core business objects.

mod engagement;
mod post;
mod user;

pub use engagement::{Reaction, ReactionCounts, ToggleOutcome};
pub use post::{Pagination, Post, PostDetail};
pub use user::{User, UserProfile};
