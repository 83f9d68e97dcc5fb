//! Database module
//!
//! Connection verification and schema checks. Migrations are raw SQL files
//! in the migrations/ directory, applied out of band.

use sqlx::PgPool;

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let required_tables = vec![
        // Balance holder variants
        "personal_accounts",
        "corporate_accounts",
        "personal_loans",
        "business_loans",
        "mortgages",
        "term_deposits",
        // Transaction record variants
        "transfers",
        "bill_payments",
        "buy_goods_purchases",
        "airtime_purchases",
        "wallet_topups",
        // Accrual run lease
        "accrual_runs",
    ];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
