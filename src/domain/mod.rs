//! Domain module
//!
//! Pure domain types: validated money amounts, balance holders, reference
//! numbers and domain errors. Nothing in here touches the database or the
//! web layer.

mod amount;
mod context;
mod error;
mod holder;
mod reference;

pub use amount::{Amount, AmountError};
pub use context::OperationContext;
pub use error::DomainError;
pub use holder::{BalanceHolder, HolderKind, HolderStatus};
pub use reference::ReferenceNumber;
