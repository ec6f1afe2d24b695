//! Transaction HTTP handlers: dashboard listing, creation, detail, and the
//! lifecycle transitions. Monetary values are serialized as strings.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::domain::lifecycle::ReviewDecision;
use crate::domain::{policy, Action, Actor, FileRef, NewTransaction, Transaction, TransactionStatus};
use crate::error::AppError;
use crate::use_cases::correct_financials::{CorrectFinancials, FinancialCorrection};
use crate::use_cases::create_transaction::CreateTransaction;
use crate::use_cases::dashboard::{DashboardProjection, DashboardQuery, DEFAULT_PAGE_SIZE};
use crate::use_cases::review_transaction::ReviewTransaction;
use crate::use_cases::verify_documentation::VerifyDocumentation;
use crate::validation::ValidationError;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTransactionRequest {
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub sector: Option<String>,
    pub nature_of_business: Option<String>,
    pub contact_name: Option<String>,
    pub contact_number: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub documentation_type: Option<String>,
    pub funding_status: Option<String>,
    pub amount: BigDecimal,
    pub amount_requested: BigDecimal,
    #[serde(default = "zero")]
    pub cedi_balance: BigDecimal,
    #[serde(default = "zero")]
    pub loan_limit: BigDecimal,
    #[serde(default = "zero")]
    pub loan_balance: BigDecimal,
    pub tenor: i32,
    #[serde(default)]
    pub uploaded_files: Vec<FileRef>,
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

impl From<CreateTransactionRequest> for NewTransaction {
    fn from(req: CreateTransactionRequest) -> Self {
        NewTransaction {
            customer_name: req.customer_name,
            customer_address: req.customer_address,
            sector: req.sector,
            nature_of_business: req.nature_of_business,
            contact_name: req.contact_name,
            contact_number: req.contact_number,
            purpose: req.purpose,
            description: req.description,
            documentation_type: req.documentation_type,
            funding_status: req.funding_status,
            amount: req.amount,
            amount_requested: req.amount_requested,
            cedi_balance: req.cedi_balance,
            loan_limit: req.loan_limit,
            loan_balance: req.loan_balance,
            tenor: req.tenor,
            uploaded_files: req.uploaded_files,
        }
    }
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub sector: Option<String>,
    pub nature_of_business: Option<String>,
    pub contact_name: Option<String>,
    pub contact_number: Option<String>,
    pub purpose: Option<String>,
    pub description: Option<String>,
    pub documentation_type: Option<String>,
    pub funding_status: Option<String>,
    pub amount: String,
    pub amount_requested: String,
    pub cedi_balance: String,
    pub loan_limit: String,
    pub loan_balance: String,
    pub tenor: i32,
    pub uploaded_files: Vec<FileRef>,
    pub status: TransactionStatus,
    pub documentation_verified: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Actions the requesting user may take next on this transaction.
    pub allowed_actions: Vec<Action>,
}

impl TransactionResponse {
    fn project(tx: Transaction, actor: &Actor, config: &crate::domain::PolicyConfig) -> Self {
        let allowed_actions = policy::allowed_actions(actor, &tx, config);
        TransactionResponse {
            id: tx.id,
            customer_name: tx.customer_name,
            customer_address: tx.customer_address,
            sector: tx.sector,
            nature_of_business: tx.nature_of_business,
            contact_name: tx.contact_name,
            contact_number: tx.contact_number,
            purpose: tx.purpose,
            description: tx.description,
            documentation_type: tx.documentation_type,
            funding_status: tx.funding_status,
            amount: tx.amount.to_string(),
            amount_requested: tx.amount_requested.to_string(),
            cedi_balance: tx.cedi_balance.to_string(),
            loan_limit: tx.loan_limit.to_string(),
            loan_balance: tx.loan_balance.to_string(),
            tenor: tx.tenor,
            uploaded_files: tx.uploaded_files,
            status: tx.status,
            documentation_verified: tx.documentation_verified,
            created_by: tx.created_by,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
            verified_by: tx.verified_by,
            verified_at: tx.verified_at,
            approved_by: tx.approved_by,
            approved_at: tx.approved_at,
            allowed_actions,
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// "pending", "approved", "denied", or "all" (default).
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
pub struct AmountTotalsResponse {
    pub total: String,
    pub pending: String,
    pub approved: String,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub items: Vec<TransactionResponse>,
    pub total_count: i64,
    pub total_pages: i64,
    pub totals: AmountTotalsResponse,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<TransactionStatus>()
                .map_err(|msg| ValidationError::new("status", msg))?,
        ),
    };

    let projection = DashboardProjection::new(state.store.clone(), state.policy);
    let page = projection
        .list(
            &actor,
            DashboardQuery {
                status,
                page: query.page.unwrap_or(1),
                page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            },
        )
        .await?;

    Ok(Json(DashboardResponse {
        items: page
            .items
            .into_iter()
            .map(|tx| TransactionResponse::project(tx, &actor, &state.policy))
            .collect(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        totals: AmountTotalsResponse {
            total: page.totals.total.to_string(),
            pending: page.totals.pending.to_string(),
            approved: page.totals.approved.to_string(),
        },
    }))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let use_case = CreateTransaction::new(state.store.clone());
    let tx = use_case.execute(&actor, request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::project(tx, &actor, &state.policy)),
    ))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let projection = DashboardProjection::new(state.store.clone(), state.policy);
    let tx = projection.detail(&actor, id).await?;

    Ok(Json(TransactionResponse::project(tx, &actor, &state.policy)))
}

pub async fn verify_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let use_case = VerifyDocumentation::new(state.store.clone(), state.policy);
    let tx = use_case.execute(&actor, id).await?;

    Ok(Json(TransactionResponse::project(tx, &actor, &state.policy)))
}

pub async fn approve_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    review(state, actor, id, ReviewDecision::Approve).await
}

pub async fn deny_transaction(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    review(state, actor, id, ReviewDecision::Deny).await
}

async fn review(
    state: AppState,
    actor: Actor,
    id: Uuid,
    decision: ReviewDecision,
) -> Result<Json<TransactionResponse>, AppError> {
    let use_case = ReviewTransaction::new(state.store.clone(), state.policy);
    let tx = use_case.execute(&actor, id, decision).await?;

    Ok(Json(TransactionResponse::project(tx, &actor, &state.policy)))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinancialCorrectionRequest {
    pub amount: Option<BigDecimal>,
    pub amount_requested: Option<BigDecimal>,
    pub cedi_balance: Option<BigDecimal>,
    pub loan_limit: Option<BigDecimal>,
    pub loan_balance: Option<BigDecimal>,
}

pub async fn correct_financials(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<FinancialCorrectionRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    let use_case = CorrectFinancials::new(state.store.clone(), state.policy);
    let tx = use_case
        .execute(
            &actor,
            id,
            FinancialCorrection {
                amount: request.amount,
                amount_requested: request.amount_requested,
                cedi_balance: request.cedi_balance,
                loan_limit: request.loan_limit,
                loan_balance: request.loan_balance,
            },
        )
        .await?;

    Ok(Json(TransactionResponse::project(tx, &actor, &state.policy)))
}
