//! Authorization policy.
//! Pure decision function mapping (actor, transaction, config) to allowed
//! actions. Queried before every mutating call; has no side effects.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::transaction::{Actor, Role, Transaction, TransactionStatus};

/// Actions a user can take on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Verify,
    Approve,
    Deny,
    EditFinancials,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Verify => "verify",
            Action::Approve => "approve",
            Action::Deny => "deny",
            Action::EditFinancials => "edit_financials",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment-level policy toggles. Both correspond to behaviour that
/// differed between historical dashboard revisions.
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfig {
    /// Gate approve/deny on documentation verification.
    pub require_verified_review: bool,
    /// Let marketing users see every transaction instead of only their own.
    pub marketing_sees_all: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            require_verified_review: true,
            marketing_sees_all: false,
        }
    }
}

/// Typed refusal. Every denied transition surfaces one of these; a denial is
/// never downgraded to a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Forbidden {
    #[error("role {role} may not {action}")]
    RoleNotPermitted { role: Role, action: Action },
    #[error("self-approval")]
    SelfApproval,
    #[error("terminal state")]
    TerminalState,
    #[error("documentation not verified")]
    DocumentationNotVerified,
    #[error("documentation already verified")]
    AlreadyVerified,
}

/// Creation is role-gated only; no transaction exists yet to inspect.
pub fn can_create(role: Role) -> bool {
    matches!(role, Role::Marketing | Role::Admin)
}

/// Whether the role's dashboard scope covers transactions it did not create.
pub fn sees_all(role: Role, config: &PolicyConfig) -> bool {
    match role {
        Role::Admin | Role::Trade | Role::Treasury => true,
        Role::Marketing => config.marketing_sees_all,
        Role::Basic => false,
    }
}

/// Visibility scope for a single transaction.
pub fn visible_to(actor: &Actor, tx: &Transaction, config: &PolicyConfig) -> bool {
    sees_all(actor.role, config) || tx.created_by == actor.id
}

/// Checks a per-transaction action. Role is checked first, then lifecycle
/// state, then actor identity, then the verification gate.
pub fn authorize(
    actor: &Actor,
    tx: &Transaction,
    action: Action,
    config: &PolicyConfig,
) -> Result<(), Forbidden> {
    match action {
        Action::View => {
            if visible_to(actor, tx, config) {
                Ok(())
            } else {
                Err(Forbidden::RoleNotPermitted {
                    role: actor.role,
                    action,
                })
            }
        }
        Action::Create => {
            if can_create(actor.role) {
                Ok(())
            } else {
                Err(Forbidden::RoleNotPermitted {
                    role: actor.role,
                    action,
                })
            }
        }
        Action::Verify => {
            if !matches!(actor.role, Role::Treasury | Role::Admin) {
                return Err(Forbidden::RoleNotPermitted {
                    role: actor.role,
                    action,
                });
            }
            if tx.status != TransactionStatus::Pending {
                return Err(Forbidden::TerminalState);
            }
            if tx.documentation_verified {
                return Err(Forbidden::AlreadyVerified);
            }
            Ok(())
        }
        Action::Approve | Action::Deny => {
            if !matches!(actor.role, Role::Trade | Role::Admin) {
                return Err(Forbidden::RoleNotPermitted {
                    role: actor.role,
                    action,
                });
            }
            if tx.status != TransactionStatus::Pending {
                return Err(Forbidden::TerminalState);
            }
            if actor.id == tx.created_by {
                return Err(Forbidden::SelfApproval);
            }
            if config.require_verified_review && !tx.documentation_verified {
                return Err(Forbidden::DocumentationNotVerified);
            }
            Ok(())
        }
        Action::EditFinancials => {
            if !matches!(actor.role, Role::Treasury | Role::Admin) {
                return Err(Forbidden::RoleNotPermitted {
                    role: actor.role,
                    action,
                });
            }
            if tx.status != TransactionStatus::Pending {
                return Err(Forbidden::TerminalState);
            }
            Ok(())
        }
    }
}

/// The full set of actions the actor may take on this transaction right now.
pub fn allowed_actions(actor: &Actor, tx: &Transaction, config: &PolicyConfig) -> Vec<Action> {
    [
        Action::View,
        Action::Create,
        Action::Verify,
        Action::Approve,
        Action::Deny,
        Action::EditFinancials,
    ]
    .into_iter()
    .filter(|action| authorize(actor, tx, *action, config).is_ok())
    .collect()
}
