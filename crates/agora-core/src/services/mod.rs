//! Application services - orchestrate ports to implement use cases.

mod engagement;
mod post;
mod user;

pub use engagement::EngagementEngine;
pub use post::PostService;
pub use user::UserService;
