//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request to exchange a refresh token for a new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user, with the posts they like and dislike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub liked_posts: Vec<Uuid>,
    pub disliked_posts: Vec<Uuid>,
}

/// Body of post create/update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub likes: u64,
    pub dislikes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
}

/// `?offset=&limit=` query of the post listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PaginationQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Result of a like/dislike toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub post_id: Uuid,
    /// `"like"` or `"dislike"`.
    pub reaction: String,
    /// Whether the caller holds the reaction after the toggle.
    pub active: bool,
    /// How many users now hold this reaction on the post.
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_flattens_user() {
        let profile = ProfileResponse {
            user: UserResponse {
                id: Uuid::nil(),
                username: "alice".to_string(),
                created_at: Utc::now(),
            },
            liked_posts: vec![],
            disliked_posts: vec![Uuid::nil()],
        };

        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["username"], "alice");
        assert!(json.get("user").is_none());
        assert_eq!(json["disliked_posts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_auth_response_omits_missing_refresh_token() {
        let response = AuthResponse {
            access_token: "a".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_in: 60,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["token_type"], "Bearer");
    }
}
