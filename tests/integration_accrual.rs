//! Accrual engine integration tests
//!
//! Run against a migrated Postgres: `cargo test -- --ignored` with
//! DATABASE_URL set.

mod common;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use benki_core::accrual::{formula, AccrualEngine, AccrualScheduler};

async fn loan_state(pool: &sqlx::PgPool, account_no: &str) -> (Decimal, Decimal) {
    sqlx::query_as(
        "SELECT outstanding_amount, accrued_interest FROM personal_loans WHERE account_no = $1",
    )
    .bind(account_no)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn accrual_applies_compound_interest_to_active_loan() {
    let pool = common::setup_test_db().await;
    let account_no = common::seed_loan(
        &pool,
        "active",
        dec!(100000),
        dec!(0.0745),
        dec!(100000),
    )
    .await;

    let engine = AccrualEngine::new(pool.clone());
    let report = engine.run_cycle(Utc::now()).await;

    assert_eq!(report.processed, 1);
    assert_eq!(report.failed, 0);

    let expected = formula::loan_interest(dec!(100000), dec!(0.0745));
    let (outstanding, accrued) = loan_state(&pool, &account_no).await;

    assert_eq!(outstanding, dec!(100000) + expected);
    assert_eq!(accrued, expected);
    // Reference value from the legacy scale divisor
    assert!(expected > dec!(0.000773) && expected < dec!(0.000774));
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn accrual_is_idempotent_within_a_period() {
    let pool = common::setup_test_db().await;
    let account_no = common::seed_loan(
        &pool,
        "active",
        dec!(100000),
        dec!(0.0745),
        dec!(100000),
    )
    .await;

    let engine = AccrualEngine::new(pool.clone());
    let first = engine.run_cycle(Utc::now()).await;
    let after_first = loan_state(&pool, &account_no).await;

    let second = engine.run_cycle(Utc::now()).await;
    let after_second = loan_state(&pool, &account_no).await;

    assert_eq!(first.processed, 1);
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn accrual_skips_non_active_holders() {
    let pool = common::setup_test_db().await;
    let closed = common::seed_loan(&pool, "closed", dec!(50000), dec!(0.10), dec!(0)).await;
    let pending =
        common::seed_loan(&pool, "in-review", dec!(50000), dec!(0.10), dec!(50000)).await;

    let engine = AccrualEngine::new(pool.clone());
    let report = engine.run_cycle(Utc::now()).await;

    assert_eq!(report.processed, 0);
    assert_eq!(report.failed, 0);

    for account_no in [&closed, &pending] {
        let (outstanding, accrued) = loan_state(&pool, account_no).await;
        assert_eq!(outstanding, dec!(50000));
        assert_eq!(accrued, dec!(0));
    }
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn accrual_grows_term_deposit_accumulated_value() {
    let pool = common::setup_test_db().await;
    let account_no = common::seed_term_deposit(&pool, dec!(100000), dec!(0.0745)).await;

    let engine = AccrualEngine::new(pool.clone());
    let report = engine.run_cycle(Utc::now()).await;
    assert_eq!(report.processed, 1);

    let expected = formula::term_deposit_interest(dec!(100000), dec!(0.0745));
    let (interest, accumulated): (Decimal, Decimal) = sqlx::query_as(
        "SELECT interest, accumulated_value FROM term_deposits WHERE account_no = $1",
    )
    .bind(&account_no)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(interest, expected);
    assert_eq!(accumulated, dec!(100000) + expected);
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn holders_accrue_in_independent_transactions() {
    let pool = common::setup_test_db().await;
    let first = common::seed_loan(&pool, "active", dec!(10000), dec!(0.05), dec!(10000)).await;
    let second = common::seed_loan(&pool, "active", dec!(20000), dec!(0.05), dec!(20000)).await;

    let engine = AccrualEngine::new(pool.clone());
    let report = engine.run_cycle(Utc::now()).await;

    assert_eq!(report.processed, 2);
    assert!(report.errors.is_empty());
    for account_no in [&first, &second] {
        let (_, accrued) = loan_state(&pool, account_no).await;
        assert!(accrued > dec!(0));
    }
}

#[tokio::test]
#[ignore = "requires a migrated Postgres (DATABASE_URL)"]
async fn scheduler_lease_prevents_double_runs() {
    let pool = common::setup_test_db().await;
    common::seed_loan(&pool, "active", dec!(10000), dec!(0.05), dec!(10000)).await;

    let scheduler = AccrualScheduler::new(pool.clone());

    let first = scheduler.run_once().await.unwrap();
    assert!(first.is_some());
    assert_eq!(first.unwrap().processed, 1);

    // Same date: lease already claimed, no second cycle.
    let second = scheduler.run_once().await.unwrap();
    assert!(second.is_none());

    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accrual_runs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(runs, 1);
}
