//! Report generation endpoint. Returns the finished bundle as an attachment;
//! nothing is streamed, a failed generation surfaces as an error response.

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::AppState;
use crate::domain::Actor;
use crate::error::AppError;
use crate::ports::RateInputs;
use crate::use_cases::generate_report::GenerateReport;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateReportRequest {
    pub indicative_buying: BigDecimal,
    pub indicative_selling: BigDecimal,
    /// Snapshot day; defaults to today.
    pub as_of: Option<NaiveDate>,
}

pub async fn generate_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<GenerateReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = GenerateReport::new(state.store.clone(), state.reports.clone());
    let as_of = request.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let bundle = use_case
        .execute(
            &actor,
            RateInputs {
                indicative_buying: request.indicative_buying,
                indicative_selling: request.indicative_selling,
            },
            as_of,
        )
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    let disposition = format!("attachment; filename=\"{}\"", bundle.filename);
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| AppError::Internal(format!("bad report filename: {e}")))?,
    );

    Ok((headers, bundle.content))
}
