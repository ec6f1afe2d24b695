use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::ports::{Session, User};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .identity
        .sign_in(&request.email, &request.password)
        .await?;

    tracing::info!("user {} signed in", session.user.id);
    Ok(Json(session))
}

pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
