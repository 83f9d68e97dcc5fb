//! Common test utilities

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(
        "TRUNCATE TABLE personal_accounts, corporate_accounts, personal_loans, \
         business_loans, mortgages, term_deposits, transfers, bill_payments, \
         buy_goods_purchases, airtime_purchases, wallet_topups, accrual_runs CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to clean up DB");

    pool
}

/// Seed an active personal account and return its account number.
pub async fn seed_account(pool: &PgPool, balance: Decimal) -> String {
    let account_no = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO personal_accounts
            (account_no, owner_customer_no, currency, account_status, account_balance)
        VALUES ($1, 42, 'KES', 'active', $2)
        "#,
    )
    .bind(&account_no)
    .bind(balance)
    .execute(pool)
    .await
    .expect("Failed to seed account");
    account_no
}

/// Seed a personal loan and return its account number.
pub async fn seed_loan(
    pool: &PgPool,
    status: &str,
    amount: Decimal,
    rate: Decimal,
    disposable: Decimal,
) -> String {
    let account_no = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO personal_loans
            (account_no, owner_customer_no, currency, account_status, rate,
             amount, disposable_amount, outstanding_amount, accrued_interest,
             payback_period, maturity_date)
        VALUES ($1, 42, 'KES', $2, $3, $4, $5, $4, 0, 12, $6)
        "#,
    )
    .bind(&account_no)
    .bind(status)
    .bind(rate)
    .bind(amount)
    .bind(disposable)
    .bind(Utc::now() + Duration::days(365))
    .execute(pool)
    .await
    .expect("Failed to seed loan");
    account_no
}

/// Seed an active term deposit and return its account number.
pub async fn seed_term_deposit(pool: &PgPool, amount: Decimal, rate: Decimal) -> String {
    let account_no = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO term_deposits
            (account_no, owner_customer_no, currency, account_status, rate,
             amount, interest, accumulated_value, maturity_date)
        VALUES ($1, 42, 'KES', 'active', $2, $3, 0, $3, $4)
        "#,
    )
    .bind(&account_no)
    .bind(rate)
    .bind(amount)
    .bind(Utc::now() + Duration::days(180))
    .execute(pool)
    .await
    .expect("Failed to seed term deposit");
    account_no
}

/// Current personal account balance.
pub async fn account_balance(pool: &PgPool, account_no: &str) -> Decimal {
    sqlx::query_scalar("SELECT account_balance FROM personal_accounts WHERE account_no = $1")
        .bind(account_no)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}

/// Count rows in a transaction record table for an account.
pub async fn record_count(pool: &PgPool, table: &str, account_no: &str) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE account_no = $1", table);
    sqlx::query_scalar(&sql)
        .bind(account_no)
        .fetch_one(pool)
        .await
        .expect("Failed to count records")
}
