//! Account handlers: signup, login, token refresh and profiles.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use agora_core::DomainError;
use agora_core::domain::User;
use agora_core::ports::{TokenKind, TokenService};
use agora_shared::dto::{
    AuthResponse, LoginRequest, PostListResponse, ProfileResponse, RefreshRequest, SignupRequest,
    UserResponse,
};

use super::post::post_response;
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        created_at: user.created_at,
    }
}

fn issue(tokens: &dyn TokenService, username: &str, kind: TokenKind) -> AppResult<String> {
    tokens
        .generate_token(username, kind)
        .map_err(|e| AppError::Internal(e.to_string()))
}

fn auth_response(
    tokens: &dyn TokenService,
    access_token: String,
    refresh_token: Option<String>,
) -> AuthResponse {
    AuthResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.expiration_seconds(TokenKind::Access).max(0) as u64,
    }
}

fn token_pair(tokens: &dyn TokenService, username: &str) -> AppResult<AuthResponse> {
    let access = issue(tokens, username, TokenKind::Access)?;
    let refresh = issue(tokens, username, TokenKind::Refresh)?;
    Ok(auth_response(tokens, access, Some(refresh)))
}

/// POST /user/signup
pub async fn signup(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state.users.signup(&req.username, &req.password).await?;
    let tokens = token_pair(token_service.get_ref().as_ref(), &user.username)?;

    Ok(HttpResponse::Created().json(tokens))
}

/// POST /user/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state.users.authenticate(&req.username, &req.password).await?;
    let tokens = token_pair(token_service.get_ref().as_ref(), &user.username)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().json(tokens))
}

/// POST /user/refresh - trade a refresh token for a fresh access token.
pub async fn refresh(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<RefreshRequest>,
) -> AppResult<HttpResponse> {
    let tokens = token_service.get_ref().as_ref();
    let claims = tokens.validate_token(&body.refresh_token, TokenKind::Refresh)?;

    let user = match state.users.find_by_username(&claims.subject).await {
        Ok(user) => user,
        Err(DomainError::NotFound { .. }) => return Err(AppError::Unauthorized),
        Err(e) => return Err(e.into()),
    };

    let access = issue(tokens, &user.username, TokenKind::Access)?;
    Ok(HttpResponse::Ok().json(auth_response(tokens, access, None)))
}

/// GET /user/me - Protected route
pub async fn me(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<HttpResponse> {
    let profile = state.users.profile(user).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: user_response(&profile.user),
        liked_posts: profile.liked_posts,
        disliked_posts: profile.disliked_posts,
    }))
}

/// GET /user/{username}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.find_by_username(&path).await?;
    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// GET /user/{username}/posts
pub async fn user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = state.users.find_by_username(&path).await?;
    let posts = state.posts.list_by_author(user.id).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: posts.iter().map(post_response).collect(),
    }))
}
