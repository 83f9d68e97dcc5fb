//! Accrual Engine
//!
//! Walks every active loan and term deposit and applies one run's worth of
//! compound interest. Each holder is updated in its own transaction so a
//! corrupted row never aborts the rest of the run; failures are classified
//! and aggregated into the report instead of thrown.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::HolderKind;

use super::formula;

/// Errors from a single holder's accrual.
#[derive(Debug, thiserror::Error)]
pub enum AccrualError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Holder disappeared during accrual")]
    RowVanished,
}

/// One failed holder in a run.
#[derive(Debug, Clone, Serialize)]
pub struct AccrualFailure {
    pub account_no: String,
    pub reason: String,
}

/// Outcome of one accrual cycle.
#[derive(Debug, Clone, Serialize)]
pub struct AccrualReport {
    pub as_of: DateTime<Utc>,
    pub processed: u64,
    /// Holders already accrued for this period (idempotence guard)
    pub skipped: u64,
    pub failed: u64,
    pub errors: Vec<AccrualFailure>,
    pub completed_at: DateTime<Utc>,
}

impl AccrualReport {
    fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            processed: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            completed_at: as_of,
        }
    }

    fn record_failure(&mut self, account_no: String, reason: String) {
        self.failed += 1;
        self.errors.push(AccrualFailure { account_no, reason });
    }
}

enum Outcome {
    Accrued,
    Skipped,
}

/// Stateless batch service computing periodic interest.
#[derive(Debug, Clone)]
pub struct AccrualEngine {
    pool: PgPool,
}

impl AccrualEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run one accrual cycle over all eligible holders.
    ///
    /// Only holders with status `active` accrue; a holder already stamped
    /// with `last_calculation_date` on or after `as_of`'s date is skipped,
    /// so running twice within the same day is a no-op for the second run.
    pub async fn run_cycle(&self, as_of: DateTime<Utc>) -> AccrualReport {
        let mut report = AccrualReport::new(as_of);

        for kind in [
            HolderKind::PersonalLoan,
            HolderKind::BusinessLoan,
            HolderKind::Mortgage,
        ] {
            self.accrue_table(kind, as_of, &mut report).await;
        }
        self.accrue_table(HolderKind::TermDeposit, as_of, &mut report)
            .await;

        report.completed_at = Utc::now();
        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            "Accrual cycle finished"
        );
        report
    }

    async fn accrue_table(
        &self,
        kind: HolderKind,
        as_of: DateTime<Utc>,
        report: &mut AccrualReport,
    ) {
        let accounts = match self.eligible_accounts(kind).await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::error!(table = kind.table(), error = %e, "Eligible-holder query failed");
                report.record_failure(format!("<{}>", kind.table()), e.to_string());
                return;
            }
        };

        for account_no in accounts {
            let result = if kind == HolderKind::TermDeposit {
                self.accrue_term_deposit(&account_no, as_of).await
            } else {
                self.accrue_loan(kind, &account_no, as_of).await
            };

            match result {
                Ok(Outcome::Accrued) => report.processed += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        account_no = %account_no,
                        table = kind.table(),
                        error = %e,
                        "Accrual failed for holder"
                    );
                    report.record_failure(account_no, e.to_string());
                }
            }
        }
    }

    /// Active holders of one variant, in account order.
    async fn eligible_accounts(&self, kind: HolderKind) -> Result<Vec<String>, AccrualError> {
        let sql = format!(
            "SELECT account_no FROM {table} WHERE account_status = 'active' ORDER BY account_no",
            table = kind.table(),
        );
        let accounts = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(accounts)
    }

    /// Apply one run of interest to a loan, in its own transaction.
    async fn accrue_loan(
        &self,
        kind: HolderKind,
        account_no: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Outcome, AccrualError> {
        let mut tx = self.pool.begin().await?;

        let select = format!(
            r#"
            SELECT amount, rate, last_calculation_date
            FROM {table}
            WHERE account_no = $1
            FOR UPDATE
            "#,
            table = kind.table(),
        );

        let row: Option<(Decimal, Decimal, Option<DateTime<Utc>>)> = sqlx::query_as(&select)
            .bind(account_no)
            .fetch_optional(&mut *tx)
            .await?;

        let (principal, rate, last_calculation_date) = row.ok_or(AccrualError::RowVanished)?;

        if already_accrued(last_calculation_date, as_of) {
            return Ok(Outcome::Skipped);
        }

        let new_interest = formula::loan_interest(principal, rate);

        let update = format!(
            r#"
            UPDATE {table}
            SET outstanding_amount = outstanding_amount + $1,
                accrued_interest = accrued_interest + $1,
                last_calculation_date = $2
            WHERE account_no = $3
            "#,
            table = kind.table(),
        );

        sqlx::query(&update)
            .bind(new_interest)
            .bind(as_of)
            .bind(account_no)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Outcome::Accrued)
    }

    /// Apply one run of interest to a term deposit, in its own transaction.
    async fn accrue_term_deposit(
        &self,
        account_no: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Outcome, AccrualError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(Decimal, Decimal, Option<DateTime<Utc>>)> = sqlx::query_as(
            r#"
            SELECT amount, rate, last_calculation_date
            FROM term_deposits
            WHERE account_no = $1
            FOR UPDATE
            "#,
        )
        .bind(account_no)
        .fetch_optional(&mut *tx)
        .await?;

        let (principal, rate, last_calculation_date) = row.ok_or(AccrualError::RowVanished)?;

        if already_accrued(last_calculation_date, as_of) {
            return Ok(Outcome::Skipped);
        }

        let new_interest = formula::term_deposit_interest(principal, rate);

        sqlx::query(
            r#"
            UPDATE term_deposits
            SET interest = interest + $1,
                accumulated_value = accumulated_value + $1,
                last_calculation_date = $2
            WHERE account_no = $3
            "#,
        )
        .bind(new_interest)
        .bind(as_of)
        .bind(account_no)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Outcome::Accrued)
    }
}

/// One accrual per nominal day: skip when the stamp is already within
/// `as_of`'s date.
fn already_accrued(last: Option<DateTime<Utc>>, as_of: DateTime<Utc>) -> bool {
    match last {
        Some(stamp) => stamp.date_naive() >= as_of.date_naive(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_already_accrued_same_day() {
        let morning = Utc.with_ymd_and_hms(2026, 8, 23, 6, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 8, 23, 18, 0, 0).unwrap();
        assert!(already_accrued(Some(morning), evening));
    }

    #[test]
    fn test_not_accrued_previous_day() {
        let yesterday = Utc.with_ymd_and_hms(2026, 8, 22, 23, 59, 0).unwrap();
        let today = Utc.with_ymd_and_hms(2026, 8, 23, 0, 1, 0).unwrap();
        assert!(!already_accrued(Some(yesterday), today));
    }

    #[test]
    fn test_never_accrued() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        assert!(!already_accrued(None, now));
    }

    #[test]
    fn test_report_failure_accounting() {
        let mut report = AccrualReport::new(Utc::now());
        report.record_failure("A1".to_string(), "boom".to_string());
        report.record_failure("A2".to_string(), "boom".to_string());

        assert_eq!(report.failed, 2);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].account_no, "A1");
    }
}
