//! Authentication extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::StatusCode, http::header, web};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use agora_core::DomainError;
use agora_core::domain::User;
use agora_core::ports::{AuthError, TokenKind, TokenService};
use agora_shared::ErrorResponse;

use super::error::{AppError, PROBLEM_JSON};
use crate::state::AppState;

/// Username carried by a valid access token.
///
/// Use this in handlers that only need the caller's name; use [`CurrentUser`]
/// when the account itself is needed.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
}

/// Error type for authentication failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct AuthenticationError(pub AuthError);

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingAuth
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::TokenExpired => ErrorResponse::new(401, "Token Expired")
                .with_detail("Your authentication token has expired. Please login again."),
            AuthError::InvalidToken(msg) => {
                ErrorResponse::new(401, "Invalid Token").with_detail(msg.clone())
            }
            AuthError::MissingAuth => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please provide a valid Bearer token in the Authorization header."),
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            AuthError::HashingError(_) => ErrorResponse::internal_error(),
        };

        actix_web::HttpResponse::build(self.status_code())
            .content_type(PROBLEM_JSON)
            .json(error)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(token_service) = req.app_data::<web::Data<Arc<dyn TokenService>>>() else {
            tracing::error!("TokenService not found in app data");
            return ready(Err(AuthenticationError(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ))));
        };

        // Refresh tokens are only good for /user/refresh.
        let result = bearer_token(req)
            .and_then(|token| token_service.validate_token(token, TokenKind::Access))
            .map(|claims| Identity {
                username: claims.subject,
            })
            .map_err(AuthenticationError);

        ready(result)
    }
}

/// The account behind a valid access token.
///
/// A token whose subject no longer exists is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload).into_inner();
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let identity = identity?;
            let state =
                state.ok_or_else(|| AppError::Internal("AppState not found in app data".into()))?;

            match state.users.find_by_username(&identity.username).await {
                Ok(user) => Ok(CurrentUser(user)),
                Err(DomainError::NotFound { .. }) => {
                    tracing::debug!(username = %identity.username, "Token subject no longer exists");
                    Err(AppError::Unauthorized.into())
                }
                Err(e) => Err(AppError::from(e).into()),
            }
        })
    }
}
