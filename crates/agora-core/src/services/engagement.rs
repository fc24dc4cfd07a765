//! Engagement engine - like/dislike toggling with mutual exclusion.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Reaction, ReactionCounts, ToggleOutcome};
use crate::error::DomainError;
use crate::ports::EngagementRepository;

/// Applies like/dislike toggles.
///
/// Every toggle runs in one unit of work: the opposite relation is cleared
/// before the requested one is flipped, so no reader ever observes a user
/// both liking and disliking a post. The engine itself is stateless and
/// relies on the repository to serialize concurrent toggles on a post.
#[derive(Clone)]
pub struct EngagementEngine {
    store: Arc<dyn EngagementRepository>,
}

impl EngagementEngine {
    pub fn new(store: Arc<dyn EngagementRepository>) -> Self {
        Self { store }
    }

    /// Toggle `actor`'s like on `post_id`, returning the new like count.
    pub async fn toggle_like(
        &self,
        actor: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        self.toggle(actor, post_id, Reaction::Like).await
    }

    /// Toggle `actor`'s dislike on `post_id`, returning the new dislike count.
    pub async fn toggle_dislike(
        &self,
        actor: Uuid,
        post_id: Uuid,
    ) -> Result<ToggleOutcome, DomainError> {
        self.toggle(actor, post_id, Reaction::Dislike).await
    }

    pub async fn toggle(
        &self,
        actor: Uuid,
        post_id: Uuid,
        reaction: Reaction,
    ) -> Result<ToggleOutcome, DomainError> {
        let mut uow = self.store.begin().await?;

        let post = uow
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        if post.is_authored_by(actor) {
            return Err(DomainError::Forbidden(format!(
                "authors cannot {} their own posts",
                reaction
            )));
        }

        if uow.remove_reaction(actor, post_id, reaction.opposite()).await? {
            tracing::debug!(
                user_id = %actor,
                post_id = %post_id,
                cleared = %reaction.opposite(),
                "Cleared opposite reaction"
            );
        }

        let active = if uow.has_reaction(actor, post_id, reaction).await? {
            uow.remove_reaction(actor, post_id, reaction).await?;
            false
        } else {
            uow.add_reaction(actor, post_id, reaction).await?;
            true
        };

        let count = uow.count_reactions(post_id, reaction).await?;
        uow.commit().await?;

        tracing::info!(
            user_id = %actor,
            post_id = %post_id,
            reaction = %reaction,
            active,
            count,
            "Reaction toggled"
        );

        Ok(ToggleOutcome {
            post_id,
            reaction,
            active,
            count,
        })
    }

    pub async fn counts(&self, post_id: Uuid) -> Result<ReactionCounts, DomainError> {
        Ok(self.store.counts(post_id).await?)
    }

    pub async fn reacted_posts(
        &self,
        user_id: Uuid,
        reaction: Reaction,
    ) -> Result<Vec<Uuid>, DomainError> {
        Ok(self.store.reacted_post_ids(user_id, reaction).await?)
    }
}
