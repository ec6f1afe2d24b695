//! Document upload and signed access URL handlers.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::domain::{policy, Action, Actor, FileRef};
use crate::error::AppError;
use crate::validation::ValidationError;

#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

pub async fn upload_file(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<FileRef>), AppError> {
    // Documents only enter the system attached to a new transaction.
    if !policy::can_create(actor.role) {
        return Err(crate::domain::Forbidden::RoleNotPermitted {
            role: actor.role,
            action: Action::Create,
        }
        .into());
    }
    if query.name.trim().is_empty() {
        return Err(ValidationError::new("name", "must not be empty").into());
    }
    if body.is_empty() {
        return Err(ValidationError::new("body", "must not be empty").into());
    }

    let file = state.files.upload(query.name.trim(), body.to_vec()).await?;
    tracing::info!("file {} uploaded by {}", file.key, actor.id);

    Ok((StatusCode::CREATED, Json(file)))
}

#[derive(Deserialize)]
pub struct AccessUrlQuery {
    pub key: String,
}

#[derive(Serialize)]
pub struct AccessUrlResponse {
    pub url: String,
}

pub async fn file_access_url(
    State(state): State<AppState>,
    Query(query): Query<AccessUrlQuery>,
) -> Result<Json<AccessUrlResponse>, AppError> {
    if query.key.trim().is_empty() {
        return Err(ValidationError::new("key", "must not be empty").into());
    }

    let file = FileRef {
        key: query.key,
        format: None,
        bytes: 0,
    };
    Ok(Json(AccessUrlResponse {
        url: state.files.access_url(&file),
    }))
}
