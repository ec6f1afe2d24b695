//! Transaction domain entity.
//! Framework-agnostic representation of a loan transaction and the actors
//! that move it through its lifecycle.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status. `Approved` and `Denied` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Denied,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Denied => "denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Approved | TransactionStatus::Denied)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "denied" => Ok(TransactionStatus::Denied),
            other => Err(format!("unknown transaction status: {other}")),
        }
    }
}

/// Role claim issued by the identity provider. Authoritative for every
/// authorization decision; fetched once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Marketing,
    Trade,
    Treasury,
    Basic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Marketing => "marketing",
            Role::Trade => "trade",
            Role::Treasury => "treasury",
            Role::Basic => "basic",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "marketing" => Ok(Role::Marketing),
            "trade" => Ok(Role::Trade),
            "treasury" => Ok(Role::Treasury),
            "basic" => Ok(Role::Basic),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated identity performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

/// Reference to an uploaded document. Files are immutable once uploaded;
/// the sequence is append-only at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Opaque storage key.
    pub key: String,
    pub format: Option<String>,
    pub bytes: i64,
}

/// Domain entity representing a loan transaction.
#[derive(Debug, Clone)]
pub struct Transaction {
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
    pub amount: BigDecimal,
    pub amount_requested: BigDecimal,
    pub cedi_balance: BigDecimal,
    pub loan_limit: BigDecimal,
    pub loan_balance: BigDecimal,
    /// Tenor in days, descriptive only.
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
}

/// Creation-time fields. Everything else is set by the lifecycle.
#[derive(Debug, Clone)]
pub struct NewTransaction {
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
    pub cedi_balance: BigDecimal,
    pub loan_limit: BigDecimal,
    pub loan_balance: BigDecimal,
    pub tenor: i32,
    pub uploaded_files: Vec<FileRef>,
}

impl Transaction {
    /// Builds a fresh pending transaction. Verification and review fields
    /// start unset and are only ever written by lifecycle transitions.
    pub fn create(input: NewTransaction, created_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_name: input.customer_name,
            customer_address: input.customer_address,
            sector: input.sector,
            nature_of_business: input.nature_of_business,
            contact_name: input.contact_name,
            contact_number: input.contact_number,
            purpose: input.purpose,
            description: input.description,
            documentation_type: input.documentation_type,
            funding_status: input.funding_status,
            amount: input.amount,
            amount_requested: input.amount_requested,
            cedi_balance: input.cedi_balance,
            loan_limit: input.loan_limit,
            loan_balance: input.loan_balance,
            tenor: input.tenor,
            uploaded_files: input.uploaded_files,
            status: TransactionStatus::Pending,
            documentation_verified: false,
            created_by,
            created_at: now,
            updated_at: now,
            verified_by: None,
            verified_at: None,
            approved_by: None,
            approved_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
