//! benki-core Library
//!
//! Re-exports modules for integration testing and external use.

pub mod accrual;
pub mod api;
pub mod domain;
pub mod ledger;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{Amount, AmountError, BalanceHolder, DomainError, HolderKind, HolderStatus};
pub use domain::{OperationContext, ReferenceNumber};
pub use ledger::{Ledger, LedgerCommand, LedgerError, OperationKind, TransactionRecord};
pub use accrual::{AccrualEngine, AccrualReport, AccrualScheduler};
