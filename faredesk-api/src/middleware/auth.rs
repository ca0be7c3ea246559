use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use faredesk_core::identity::Actor;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

/// Decode the bearer token and resolve the acting identity. Handlers read
/// the `Actor` back out of request extensions; roles other than ADMIN are
/// treated as agents.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthenticated("Expected a bearer token".to_string()))?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthenticated(e.to_string()))?;

    let claims = token_data.claims;
    let actor = Actor {
        id: claims.sub,
        email: claims.email,
        name: claims.name,
        is_admin: claims.role == "ADMIN",
    };

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
