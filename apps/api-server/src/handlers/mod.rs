//! HTTP handlers and route configuration.

mod health;
mod post;
mod user;

use actix_web::web;

use crate::middleware::error::configure_extractors;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);

    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/user")
                .route("/signup", web::post().to(user::signup))
                .route("/login", web::post().to(user::login))
                .route("/refresh", web::post().to(user::refresh))
                // Protected
                .route("/me", web::get().to(user::me))
                .route("/{username}", web::get().to(user::get_user))
                .route("/{username}/posts", web::get().to(user::user_posts)),
        )
        .service(
            web::scope("/post")
                .route("/all", web::get().to(post::list_posts))
                .route("/create", web::post().to(post::create_post))
                .route("/{id}", web::get().to(post::get_post))
                .route("/{id}/update", web::patch().to(post::update_post))
                .route("/{id}/like", web::post().to(post::like_post))
                .route("/{id}/dislike", web::post().to(post::dislike_post)),
        );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    use agora_core::ports::TokenService;
    use agora_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};
    use agora_shared::dto::{AuthResponse, PostResponse, ReactionResponse};

    use crate::state::AppState;

    macro_rules! test_app {
        () => {{
            let passwords = Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap());
            let tokens: Arc<dyn TokenService> =
                Arc::new(JwtTokenService::new(JwtConfig::default()));
            test::init_service(
                App::new()
                    .app_data(web::Data::new(tokens))
                    .app_data(web::Data::new(AppState::in_memory(passwords)))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    macro_rules! signup {
        ($app:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/user/signup")
                .set_json(json!({ "username": $username, "password": "password123" }))
                .to_request();
            let auth: AuthResponse = test::call_and_read_body_json(&$app, req).await;
            auth
        }};
    }

    macro_rules! create_post {
        ($app:expr, $token:expr, $content:expr) => {{
            let req = test::TestRequest::post()
                .uri("/post/create")
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .set_json(json!({ "content": $content }))
                .to_request();
            let post: PostResponse = test::call_and_read_body_json(&$app, req).await;
            post
        }};
    }

    macro_rules! react {
        ($app:expr, $token:expr, $post_id:expr, $reaction:expr) => {{
            test::TestRequest::post()
                .uri(&format!("/post/{}/{}", $post_id, $reaction))
                .insert_header(("Authorization", format!("Bearer {}", $token)))
                .to_request()
        }};
    }

    #[actix_rt::test]
    async fn test_health() {
        let app = test_app!();

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_like_dislike_scenario() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        let bob = signup!(app, "bob");
        let p1 = create_post!(app, alice.access_token, "hello");

        let liked: ReactionResponse =
            test::call_and_read_body_json(&app, react!(app, bob.access_token, p1.id, "like"))
                .await;
        assert!(liked.active);
        assert_eq!(liked.count, 1);

        let unliked: ReactionResponse =
            test::call_and_read_body_json(&app, react!(app, bob.access_token, p1.id, "like"))
                .await;
        assert!(!unliked.active);
        assert_eq!(unliked.count, 0);

        let disliked: ReactionResponse =
            test::call_and_read_body_json(&app, react!(app, bob.access_token, p1.id, "dislike"))
                .await;
        assert_eq!(disliked.reaction, "dislike");
        assert_eq!(disliked.count, 1);

        let req = test::TestRequest::get()
            .uri(&format!("/post/{}", p1.id))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["likes"], 0);
        assert_eq!(detail["dislikes"], 1);

        let req = test::TestRequest::get()
            .uri("/user/me")
            .insert_header(("Authorization", format!("Bearer {}", bob.access_token)))
            .to_request();
        let me: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(me["username"], "bob");
        assert_eq!(me["liked_posts"], json!([]));
        assert_eq!(me["disliked_posts"], json!([p1.id]));
    }

    #[actix_rt::test]
    async fn test_like_after_dislike_clears_dislike() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        let bob = signup!(app, "bob");
        let p1 = create_post!(app, alice.access_token, "hello");

        test::call_service(&app, react!(app, bob.access_token, p1.id, "dislike")).await;
        let liked: ReactionResponse =
            test::call_and_read_body_json(&app, react!(app, bob.access_token, p1.id, "like"))
                .await;
        assert!(liked.active);

        let req = test::TestRequest::get()
            .uri(&format!("/post/{}", p1.id))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["likes"], 1);
        assert_eq!(detail["dislikes"], 0);
    }

    #[actix_rt::test]
    async fn test_author_cannot_react_to_own_post() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        let p1 = create_post!(app, alice.access_token, "mine");

        let res = test::call_service(&app, react!(app, alice.access_token, p1.id, "like")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 403);
        assert_eq!(body["title"], "Forbidden");
    }

    #[actix_rt::test]
    async fn test_react_to_missing_post() {
        let app = test_app!();
        let bob = signup!(app, "bob");

        let missing = uuid::Uuid::new_v4();
        let res = test::call_service(&app, react!(app, bob.access_token, missing, "like")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_duplicate_signup_conflicts_and_keeps_password() {
        let app = test_app!();
        signup!(app, "alice");

        let req = test::TestRequest::post()
            .uri("/user/signup")
            .set_json(json!({ "username": "alice", "password": "another-password" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/user/login")
            .set_json(json!({ "username": "alice", "password": "password123" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/user/login")
            .set_json(json!({ "username": "alice", "password": "another-password" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_signup_rejects_invalid_input() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/user/signup")
            .set_json(json!({ "username": "al", "password": "password123" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/user/signup")
            .set_json(json!({ "username": "alice", "password": "short" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_protected_routes_require_access_token() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        let refresh_token = alice.refresh_token.unwrap();

        let req = test::TestRequest::post()
            .uri("/post/create")
            .set_json(json!({ "content": "hi" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/post/create")
            .insert_header(("Authorization", format!("Bearer {refresh_token}")))
            .set_json(json!({ "content": "hi" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_refresh_issues_access_token() {
        let app = test_app!();
        let alice = signup!(app, "alice");

        let req = test::TestRequest::post()
            .uri("/user/refresh")
            .set_json(json!({ "refresh_token": alice.refresh_token.unwrap() }))
            .to_request();
        let refreshed: AuthResponse = test::call_and_read_body_json(&app, req).await;
        assert!(refreshed.refresh_token.is_none());

        create_post!(app, refreshed.access_token, "still me");

        // An access token is not a refresh token.
        let req = test::TestRequest::post()
            .uri("/user/refresh")
            .set_json(json!({ "refresh_token": alice.access_token }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_token_for_unknown_user_is_rejected() {
        let app = test_app!();
        let tokens = JwtTokenService::new(JwtConfig::default());
        let ghost = tokens
            .generate_token("ghost", agora_core::ports::TokenKind::Access)
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/user/me")
            .insert_header(("Authorization", format!("Bearer {ghost}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_only_author_can_update_post() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        let bob = signup!(app, "bob");
        let p1 = create_post!(app, alice.access_token, "draft");

        let req = test::TestRequest::patch()
            .uri(&format!("/post/{}/update", p1.id))
            .insert_header(("Authorization", format!("Bearer {}", bob.access_token)))
            .set_json(json!({ "content": "vandalised" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::patch()
            .uri(&format!("/post/{}/update", p1.id))
            .insert_header(("Authorization", format!("Bearer {}", alice.access_token)))
            .set_json(json!({ "content": "final" }))
            .to_request();
        let updated: PostResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.content, "final");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[actix_rt::test]
    async fn test_listing_and_user_lookups() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        for i in 0..3 {
            create_post!(app, alice.access_token, format!("post {i}"));
        }

        let req = test::TestRequest::get().uri("/post/all").to_request();
        let all: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all["posts"].as_array().unwrap().len(), 3);

        let req = test::TestRequest::get()
            .uri("/post/all?offset=1&limit=1")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["posts"].as_array().unwrap().len(), 1);
        assert_eq!(page["posts"][0], all["posts"][1]);

        let req = test::TestRequest::get().uri("/user/alice").to_request();
        let user: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(user["username"], "alice");
        assert!(user.get("password_hash").is_none());

        let req = test::TestRequest::get()
            .uri("/user/alice/posts")
            .to_request();
        let posts: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(posts["posts"].as_array().unwrap().len(), 3);

        let req = test::TestRequest::get().uri("/user/nobody").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_oversized_offset_is_clamped() {
        let app = test_app!();
        let alice = signup!(app, "alice");
        create_post!(app, alice.access_token, "only post");

        let req = test::TestRequest::get()
            .uri("/post/all?offset=18446744073709551615")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["posts"], json!([]));
    }

    #[actix_rt::test]
    async fn test_extractor_failures_are_problem_documents() {
        let app = test_app!();

        let cases = [
            (
                test::TestRequest::post()
                    .uri("/user/signup")
                    .insert_header(("Content-Type", "application/json"))
                    .set_payload("{")
                    .to_request(),
                StatusCode::BAD_REQUEST,
            ),
            (
                test::TestRequest::get().uri("/post/not-a-uuid").to_request(),
                StatusCode::NOT_FOUND,
            ),
            (
                test::TestRequest::get()
                    .uri("/post/all?offset=-1")
                    .to_request(),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (req, status) in cases {
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), status);

            let content_type = res.headers().get("content-type").unwrap().to_str().unwrap();
            assert!(content_type.contains("json"), "{content_type}");

            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["status"], status.as_u16());
            assert_eq!(body["type"], "about:blank");
        }
    }

    #[actix_rt::test]
    async fn test_missing_token_is_problem_document() {
        let app = test_app!();

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/user/me").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["title"], "Authentication Required");
    }
}
