//! Holder repository
//!
//! SQL plumbing for the ledger: polymorphic holder lookup with row locks,
//! balance debits, and transaction record inserts with reference-collision
//! retry. Table and column names come from the `HolderKind`/`OperationKind`
//! enums, never from caller input.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use crate::domain::{
    Amount, BalanceHolder, DomainError, HolderKind, HolderStatus, OperationContext,
    ReferenceNumber,
};

use super::{LedgerCommand, LedgerError, TransactionRecord};

/// Bounded wait for row locks; expiry surfaces as a Conflict upstream.
const LOCK_TIMEOUT_MS: u32 = 2_000;

/// Attempts at generating a non-colliding reference number.
const MAX_REF_RETRIES: u32 = 5;

/// Postgres error codes we branch on.
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";
const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, Default)]
pub struct HolderRepository;

impl HolderRepository {
    pub fn new() -> Self {
        Self
    }

    /// Apply a local lock timeout to the transaction.
    pub async fn set_lock_timeout(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(), sqlx::Error> {
        // SET LOCAL cannot take bind parameters; the value is a constant.
        let stmt = format!("SET LOCAL lock_timeout = '{}ms'", LOCK_TIMEOUT_MS);
        sqlx::query(&stmt).execute(&mut **tx).await?;
        Ok(())
    }

    /// Look up and row-lock a balance holder, probing the variant tables in
    /// fixed precedence order. Returns `None` if no table has the account.
    pub async fn lock_holder(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        account_no: &str,
    ) -> Result<Option<BalanceHolder>, LedgerError> {
        for kind in HolderKind::ledger_lookup_order() {
            let column = kind
                .spendable_column()
                .expect("ledger lookup order only contains spendable kinds");

            let sql = format!(
                r#"
                SELECT account_no, owner_customer_no, currency, account_status, {column}
                FROM {table}
                WHERE account_no = $1
                FOR UPDATE
                "#,
                column = column,
                table = kind.table(),
            );

            let row: Option<(String, i64, String, String, Decimal)> = sqlx::query_as(&sql)
                .bind(account_no)
                .fetch_optional(&mut **tx)
                .await
                .map_err(|e| classify_lock_error(e, account_no))?;

            if let Some((account_no, owner_customer_no, currency, status, spendable)) = row {
                let status = HolderStatus::parse(&status).ok_or_else(|| {
                    DomainError::HolderNotActive {
                        account_no: account_no.clone(),
                        status,
                    }
                })?;

                return Ok(Some(BalanceHolder {
                    kind: *kind,
                    account_no,
                    owner_customer_no,
                    currency,
                    status,
                    spendable,
                }));
            }
        }

        Ok(None)
    }

    /// Decrement the holder's spendable column. The row is already locked.
    pub async fn apply_debit(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        holder: &BalanceHolder,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let column = holder
            .kind
            .spendable_column()
            .expect("debited holder must be a spendable kind");

        let sql = format!(
            "UPDATE {table} SET {column} = {column} - $1 WHERE account_no = $2",
            table = holder.kind.table(),
            column = column,
        );

        sqlx::query(&sql)
            .bind(amount.value())
            .bind(&holder.account_no)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Insert the transaction record, regenerating the reference number on a
    /// unique-constraint collision.
    pub async fn insert_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        command: &LedgerCommand,
        holder: &BalanceHolder,
        amount: &Amount,
        context: &OperationContext,
    ) -> Result<TransactionRecord, LedgerError> {
        let date_posted = Utc::now();

        // Wallet top-ups additionally record the receiving service provider;
        // the other record tables share the common column set.
        let with_provider = matches!(command.kind, crate::ledger::OperationKind::WalletTopUp);
        let sql = if with_provider {
            format!(
                r#"
                INSERT INTO {table} (
                    ref_no, account_no, amount, currency, beneficiary,
                    remarks, transaction_type, owner_customer_no,
                    date_posted, service_provider
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
                table = command.kind.record_table(),
            )
        } else {
            format!(
                r#"
                INSERT INTO {table} (
                    ref_no, account_no, amount, currency, beneficiary,
                    remarks, transaction_type, owner_customer_no, date_posted
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
                table = command.kind.record_table(),
            )
        };

        for attempt in 0..MAX_REF_RETRIES {
            let ref_no = ReferenceNumber::generate();

            let mut query = sqlx::query(&sql)
                .bind(ref_no.as_str())
                .bind(&holder.account_no)
                .bind(amount.value())
                .bind(&holder.currency)
                .bind(&command.beneficiary)
                .bind(&command.remarks)
                .bind(command.kind.transaction_type())
                .bind(context.owner_customer_no)
                .bind(date_posted);
            if with_provider {
                query = query.bind(&command.service_provider);
            }
            let result = query.execute(&mut **tx).await;

            match result {
                Ok(_) => {
                    return Ok(TransactionRecord {
                        ref_no: ref_no.as_str().to_string(),
                        transaction_type: command.kind.transaction_type().to_string(),
                        account_no: holder.account_no.clone(),
                        amount: amount.value(),
                        currency: holder.currency.clone(),
                        beneficiary: command.beneficiary.clone(),
                        remarks: command.remarks.clone(),
                        owner_customer_no: context.owner_customer_no,
                        date_posted,
                        service_provider: command.service_provider.clone(),
                    });
                }
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(
                        ref_no = %ref_no,
                        attempt = attempt + 1,
                        "Reference number collision, regenerating"
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LedgerError::RefNumberExhausted)
    }
}

/// Map a lock-timeout expiry to contention; pass other errors through.
fn classify_lock_error(e: sqlx::Error, account_no: &str) -> LedgerError {
    if pg_code(&e).as_deref() == Some(PG_LOCK_NOT_AVAILABLE) {
        DomainError::LockContention(account_no.to_string()).into()
    } else {
        e.into()
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    pg_code(e).as_deref() == Some(PG_UNIQUE_VIOLATION)
}

fn pg_code(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}
