//! Post operations.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Pagination, Post, PostDetail};
use crate::error::DomainError;
use crate::ports::PostRepository;

use super::EngagementEngine;

const CONTENT_MAX: usize = 10_000;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    engagement: EngagementEngine,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, engagement: EngagementEngine) -> Self {
        Self { posts, engagement }
    }

    pub async fn create(&self, author_id: Uuid, content: String) -> Result<Post, DomainError> {
        validate_content(&content)?;

        let post = self.posts.create(Post::new(author_id, content)).await?;
        tracing::info!(post_id = %post.id, user_id = %author_id, "Post created");
        Ok(post)
    }

    /// A post with its like/dislike counts.
    pub async fn get(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.find(id).await?;
        let counts = self.engagement.counts(id).await?;
        Ok(PostDetail { post, counts })
    }

    pub async fn list(&self, page: Pagination) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list(page).await?)
    }

    pub async fn list_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.find_by_user_id(user_id).await?)
    }

    /// Replace a post's content. Only the author may do this.
    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        content: String,
    ) -> Result<Post, DomainError> {
        let mut post = self.find(id).await?;
        if !post.is_authored_by(actor_id) {
            return Err(DomainError::Forbidden(
                "only the author can edit this post".to_string(),
            ));
        }
        validate_content(&content)?;

        post.edit(content);
        let post = self.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::Validation("content must not be empty".to_string()));
    }
    if content.chars().count() > CONTENT_MAX {
        return Err(DomainError::Validation(format!(
            "content must be at most {CONTENT_MAX} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content() {
        assert!(validate_content("hello").is_ok());
        assert!(validate_content("   \n").is_err());
        assert!(validate_content(&"a".repeat(CONTENT_MAX)).is_ok());
        assert!(validate_content(&"a".repeat(CONTENT_MAX + 1)).is_err());
    }
}
