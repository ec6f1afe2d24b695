//! Session middleware. Resolves the bearer token against the identity
//! provider once per request and stashes the resulting actor in request
//! extensions; handlers never touch tokens themselves.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::domain::Actor;
use crate::error::AppError;
use crate::AppState;

pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?
        .to_string();

    let user = state.identity.current_user(&token).await?;

    req.extensions_mut().insert(Actor::new(user.id, user.role));
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
