//! Create transaction use case.
//! Marketing (or admin) submits a new loan transaction with its documents.

use chrono::Utc;
use std::sync::Arc;

use crate::domain::{policy, Action, Actor, NewTransaction, Transaction};
use crate::error::AppError;
use crate::ports::TransactionStore;
use crate::validation;

pub struct CreateTransaction {
    store: Arc<dyn TransactionStore>,
}

impl CreateTransaction {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        actor: &Actor,
        input: NewTransaction,
    ) -> Result<Transaction, AppError> {
        if !policy::can_create(actor.role) {
            return Err(policy::Forbidden::RoleNotPermitted {
                role: actor.role,
                action: Action::Create,
            }
            .into());
        }

        validate(&input)?;

        let tx = Transaction::create(input, actor.id, Utc::now());
        let stored = self.store.insert(&tx).await?;

        tracing::info!(
            "transaction {} created by {} for {}",
            stored.id,
            actor.id,
            stored.customer_name
        );
        Ok(stored)
    }
}

fn validate(input: &NewTransaction) -> Result<(), validation::ValidationError> {
    validation::validate_customer_name(&input.customer_name)?;
    validation::validate_non_negative_amount("amount", &input.amount)?;
    validation::validate_non_negative_amount("amount_requested", &input.amount_requested)?;
    validation::validate_non_negative_amount("cedi_balance", &input.cedi_balance)?;
    validation::validate_non_negative_amount("loan_limit", &input.loan_limit)?;
    validation::validate_non_negative_amount("loan_balance", &input.loan_balance)?;
    validation::validate_tenor(input.tenor)?;
    validation::validate_optional_text("customer_address", &input.customer_address)?;
    validation::validate_optional_text("sector", &input.sector)?;
    validation::validate_optional_text("nature_of_business", &input.nature_of_business)?;
    validation::validate_optional_text("contact_name", &input.contact_name)?;
    if let Some(contact_number) = &input.contact_number {
        validation::validate_max_len(
            "contact_number",
            contact_number,
            validation::CONTACT_NUMBER_MAX_LEN,
        )?;
    }
    validation::validate_optional_text("purpose", &input.purpose)?;
    validation::validate_optional_text("description", &input.description)?;
    validation::validate_optional_text("documentation_type", &input.documentation_type)?;
    validation::validate_optional_text("funding_status", &input.funding_status)?;
    Ok(())
}
