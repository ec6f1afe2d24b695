use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::domain::PolicyConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub identity_base_url: String,
    pub storage_base_url: String,
    pub storage_signing_secret: String,
    pub report_service_url: String,
    /// Marketing dashboards show every transaction instead of own-created.
    pub marketing_sees_all: bool,
    /// Approve/deny requires documentation verification first.
    pub require_verified_review: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            identity_base_url: env::var("IDENTITY_BASE_URL")?,
            storage_base_url: env::var("STORAGE_BASE_URL")?,
            storage_signing_secret: env::var("STORAGE_SIGNING_SECRET")?,
            report_service_url: env::var("REPORT_SERVICE_URL")?,
            marketing_sees_all: parse_flag("MARKETING_SEES_ALL", false)?,
            require_verified_review: parse_flag("REQUIRE_VERIFIED_REVIEW", true)?,
        })
    }

    pub fn policy(&self) -> PolicyConfig {
        PolicyConfig {
            require_verified_review: self.require_verified_review,
            marketing_sees_all: self.marketing_sees_all,
        }
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => anyhow::bail!("{name} must be a boolean, got '{other}'"),
        },
        Err(_) => Ok(default),
    }
}
