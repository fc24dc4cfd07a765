//! Account operations: signup, credential checks, lookups.

use std::sync::Arc;

use crate::domain::{Reaction, User, UserProfile};
use crate::error::{DomainError, RepoError};
use crate::ports::{PasswordService, UserRepository};

use super::EngagementEngine;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    engagement: EngagementEngine,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        engagement: EngagementEngine,
    ) -> Self {
        Self {
            users,
            passwords,
            engagement,
        }
    }

    /// Register a new account. An existing account with the same username is never touched.
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, DomainError> {
        validate_username(username)?;
        if password.chars().count() < PASSWORD_MIN {
            return Err(DomainError::Validation(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "username '{username}' is already taken"
            )));
        }

        let password_hash = self
            .passwords
            .hash(password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .create(User::new(username.to_string(), password_hash))
            .await
            .map_err(|e| match e {
                // Lost a race against a concurrent signup.
                RepoError::Constraint(_) => {
                    DomainError::Duplicate(format!("username '{username}' is already taken"))
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(user)
    }

    /// Check a username/password pair. Unknown users and wrong passwords are indistinguishable.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Login for unknown user");
            return Err(DomainError::Unauthorized);
        };

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::Unauthorized);
        }

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))
    }

    /// A user together with the posts they like and dislike.
    pub async fn profile(&self, user: User) -> Result<UserProfile, DomainError> {
        let liked_posts = self.engagement.reacted_posts(user.id, Reaction::Like).await?;
        let disliked_posts = self
            .engagement
            .reacted_posts(user.id, Reaction::Dislike)
            .await?;

        Ok(UserProfile {
            user,
            liked_posts,
            disliked_posts,
        })
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(DomainError::Validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(DomainError::Validation(
            "username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_the-builder.2").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username(&"x".repeat(USERNAME_MAX + 1)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("émile").is_err());
    }
}
