use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Pagination, Post, Reaction, ReactionCounts, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-key collisions surface as `RepoError::Constraint`.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Page through all posts in `(created_at, id)` order.
    async fn list(&self, page: Pagination) -> Result<Vec<Post>, RepoError>;

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;
}

/// Access to the like/dislike relations.
///
/// Mutations only happen through an [`EngagementUnitOfWork`], so that a whole
/// toggle (exclusion check, removal, insertion, recount) commits or rolls back
/// as one.
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Open a unit of work. Dropping it without [`EngagementUnitOfWork::commit`] rolls back.
    async fn begin(&self) -> Result<Box<dyn EngagementUnitOfWork>, RepoError>;

    /// Current like/dislike tallies of a post.
    async fn counts(&self, post_id: Uuid) -> Result<ReactionCounts, RepoError>;

    /// Ids of the posts `user_id` holds `reaction` on.
    async fn reacted_post_ids(
        &self,
        user_id: Uuid,
        reaction: Reaction,
    ) -> Result<Vec<Uuid>, RepoError>;
}

/// A transactional handle over the engagement relations.
///
/// Implementations must serialize units of work that touch the same post:
/// `find_post` is expected to lock the post for the lifetime of the unit.
#[async_trait]
pub trait EngagementUnitOfWork: Send {
    /// Load a post, locking it until commit or rollback.
    async fn find_post(&mut self, post_id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn has_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError>;

    async fn add_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<(), RepoError>;

    /// Remove a relation. Returns whether one existed.
    async fn remove_reaction(
        &mut self,
        user_id: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<bool, RepoError>;

    async fn count_reactions(&mut self, post_id: Uuid, reaction: Reaction)
    -> Result<u64, RepoError>;

    /// Make every change of this unit visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), RepoError>;
}
