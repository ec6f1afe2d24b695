pub mod lifecycle;
pub mod policy;
pub mod transaction;

pub use policy::{Action, Forbidden, PolicyConfig};
pub use transaction::{
    Actor, FileRef, NewTransaction, Role, Transaction, TransactionStatus,
};
