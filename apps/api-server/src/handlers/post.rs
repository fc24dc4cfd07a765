//! Post handlers, including like/dislike toggles.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use agora_core::domain::{Pagination, Post, ToggleOutcome};
use agora_shared::dto::{
    PaginationQuery, PostDetailResponse, PostListResponse, PostRequest, PostResponse,
    ReactionResponse,
};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.user_id,
        content: post.content.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn reaction_response(outcome: ToggleOutcome) -> ReactionResponse {
    ReactionResponse {
        post_id: outcome.post_id,
        reaction: outcome.reaction.to_string(),
        active: outcome.active,
        count: outcome.count,
    }
}

/// GET /post/all?offset=&limit=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PaginationQuery>,
) -> AppResult<HttpResponse> {
    let page = Pagination::new(query.offset, query.limit);
    let posts = state.posts.list(page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: posts.iter().map(post_response).collect(),
    }))
}

/// GET /post/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = state.posts.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(&detail.post),
        likes: detail.counts.likes,
        dislikes: detail.counts.dislikes,
    }))
}

/// POST /post/create
pub async fn create_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .create(user.id, body.into_inner().content)
        .await?;

    Ok(HttpResponse::Created().json(post_response(&post)))
}

/// PATCH /post/{id}/update
pub async fn update_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .update(user.id, path.into_inner(), body.into_inner().content)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(&post)))
}

/// POST /post/{id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .engagement
        .toggle_like(user.id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(reaction_response(outcome)))
}

/// POST /post/{id}/dislike
pub async fn dislike_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .engagement
        .toggle_dislike(user.id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(reaction_response(outcome)))
}
