//! SeaORM entities, one module per table.

pub mod post;
pub mod post_dislike;
pub mod post_like;
pub mod user;
