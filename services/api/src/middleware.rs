//! Authentication middleware
//!
//! Establishes the [`Actor`] for every request. A missing Authorization
//! header yields an anonymous actor, since read endpoints are public; a
//! present but invalid bearer token is rejected outright.

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;
use crate::jwt::TokenType;
use crate::policy::Actor;
use crate::state::AppState;

/// Resolve the caller into an [`Actor`] and store it in request extensions
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let actor = match auth_header {
        None => Actor::Anonymous,
        Some(header) => {
            let token = header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            let claims = state.jwt_service.validate_token(token).map_err(|e| {
                debug!("Token validation failed: {}", e);
                ApiError::Unauthorized
            })?;

            // Refresh tokens only refresh; they never authenticate requests
            if claims.token_type != TokenType::Access {
                return Err(ApiError::Unauthorized);
            }

            Actor::User {
                id: claims.sub,
                is_moderator: claims.is_moderator,
            }
        }
    };

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
