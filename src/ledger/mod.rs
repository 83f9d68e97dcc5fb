//! Ledger module
//!
//! Executes a single money-movement operation as an atomic unit: debit
//! exactly one balance holder, append exactly one transaction record, or
//! fail with no effect. All serialization between concurrent operations on
//! the same holder happens through row locks taken inside the database
//! transaction.

mod command;
mod repository;

pub use command::{LedgerCommand, OperationKind, TransactionRecord};
pub use repository::HolderRepository;

use sqlx::PgPool;

use crate::domain::{Amount, DomainError, OperationContext};

/// Errors from ledger execution.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Reference-number collisions exhausted the bounded retries
    #[error("Could not generate a unique reference number")]
    RefNumberExhausted,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Stateless ledger service over the persisted holder and record tables.
#[derive(Debug, Clone)]
pub struct Ledger {
    repository: HolderRepository,
    pool: PgPool,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: HolderRepository::new(),
            pool,
        }
    }

    /// Execute a money-movement operation.
    ///
    /// Preconditions are checked in order: holder exists, amount is a valid
    /// positive value, spendable balance is sufficient. The balance
    /// decrement and the record insert commit together or not at all.
    pub async fn execute(
        &self,
        command: LedgerCommand,
        context: &OperationContext,
    ) -> Result<TransactionRecord, LedgerError> {
        let mut tx = self.pool.begin().await?;

        // Bounded lock wait so contended holders surface as Conflict
        // instead of blocking the request indefinitely.
        self.repository.set_lock_timeout(&mut tx).await?;

        let holder = self
            .repository
            .lock_holder(&mut tx, &command.account_no)
            .await?
            .ok_or_else(|| DomainError::HolderNotFound(command.account_no.clone()))?;

        let amount = Amount::new(command.amount)
            .map_err(|e| DomainError::InvalidAmount(e.to_string()))?;

        holder.check_debit(&amount)?;

        self.repository
            .apply_debit(&mut tx, &holder, &amount)
            .await?;

        let record = self
            .repository
            .insert_record(&mut tx, &command, &holder, &amount, context)
            .await?;

        tx.commit().await?;

        tracing::info!(
            ref_no = %record.ref_no,
            account_no = %holder.account_no,
            kind = %command.kind,
            amount = %amount,
            "Ledger operation committed"
        );

        Ok(record)
    }
}
