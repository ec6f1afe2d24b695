//! HTTP client for the report generation service. The service runs the
//! spreadsheet pipeline; we only hand it the rate sheet plus the approved
//! snapshot and take back the finished bundle. Nothing partial is ever
//! surfaced: either the whole artifact comes back or the call fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::Transaction;
use crate::ports::{RateInputs, ReportBundle, ReportError, ReportGenerator};

#[derive(Clone)]
pub struct ReportServiceClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    rate_csv: String,
    transactions: Vec<ReportRow>,
}

#[derive(Serialize)]
struct ReportRow {
    id: String,
    customer_name: String,
    sector: Option<String>,
    amount: String,
    amount_requested: String,
    tenor: i32,
    approved_at: Option<String>,
}

impl From<&Transaction> for ReportRow {
    fn from(tx: &Transaction) -> Self {
        ReportRow {
            id: tx.id.to_string(),
            customer_name: tx.customer_name.clone(),
            sector: tx.sector.clone(),
            amount: tx.amount.to_string(),
            amount_requested: tx.amount_requested.to_string(),
            tenor: tx.tenor,
            approved_at: tx.approved_at.map(|at| at.to_rfc3339()),
        }
    }
}

impl ReportServiceClient {
    pub fn new(base_url: String) -> Self {
        // Report generation drives a spreadsheet macro; give it time.
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self { client, base_url }
    }
}

/// The rate sheet the pipeline expects: a header row and one data row.
pub fn rate_csv(rates: &RateInputs) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(["INDICATIVE BUYING", "INDICATIVE SELLING"])
        .map_err(|e| ReportError::Failed(e.to_string()))?;
    writer
        .write_record([
            rates.indicative_buying.to_string(),
            rates.indicative_selling.to_string(),
        ])
        .map_err(|e| ReportError::Failed(e.to_string()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Failed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Failed(e.to_string()))
}

#[async_trait]
impl ReportGenerator for ReportServiceClient {
    async fn generate(
        &self,
        rates: &RateInputs,
        approved: &[Transaction],
    ) -> Result<ReportBundle, ReportError> {
        let request = GenerateRequest {
            rate_csv: rate_csv(rates)?,
            transactions: approved.iter().map(ReportRow::from).collect(),
        };

        let response = self
            .client
            .post(format!("{}/generate-report", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| ReportError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Failed(format!(
                "report service returned {status}"
            )));
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split("filename=").nth(1))
            .map(|v| v.trim_matches('"').to_string())
            .unwrap_or_else(|| {
                format!("fx_pipeline_{}.zip", chrono::Utc::now().format("%Y-%m-%d"))
            });

        // Buffer the whole body before returning anything.
        let content = response
            .bytes()
            .await
            .map_err(|e| ReportError::Upstream(e.to_string()))?
            .to_vec();

        if content.is_empty() {
            return Err(ReportError::Failed("report bundle was empty".to_string()));
        }

        Ok(ReportBundle { filename, content })
    }
}
