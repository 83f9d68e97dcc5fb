//! API Routes
//!
//! HTTP endpoint definitions for ledger operations and the manual accrual
//! trigger.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::accrual::{AccrualEngine, AccrualReport};
use crate::domain::OperationContext;
use crate::error::AppError;
use crate::ledger::{Ledger, LedgerCommand, OperationKind, TransactionRecord};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// Source account/contract number to debit
    pub account: String,
    pub amount: Decimal,
    pub beneficiary: String,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Only meaningful for wallet top-ups
    #[serde(default)]
    pub service_provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub ref_no: String,
    pub transaction_type: String,
    pub account: String,
    pub amount: Decimal,
    pub currency: String,
    pub beneficiary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub date_posted: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            ref_no: record.ref_no,
            transaction_type: record.transaction_type,
            account: record.account_no,
            amount: record.amount,
            currency: record.currency,
            beneficiary: record.beneficiary,
            remarks: record.remarks,
            date_posted: record.date_posted,
            service_provider: record.service_provider,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccrualRunResponse {
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub errors: Vec<AccrualErrorEntry>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AccrualErrorEntry {
    pub account: String,
    pub reason: String,
}

impl From<AccrualReport> for AccrualRunResponse {
    fn from(report: AccrualReport) -> Self {
        Self {
            processed: report.processed,
            skipped: report.skipped,
            failed: report.failed,
            errors: report
                .errors
                .into_iter()
                .map(|f| AccrualErrorEntry {
                    account: f.account_no,
                    reason: f.reason,
                })
                .collect(),
            completed_at: report.completed_at,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        .route("/transactions/transfer", post(transfer))
        .route("/transactions/paybill", post(paybill))
        .route("/transactions/buy-goods", post(buy_goods))
        .route("/transactions/airtime", post(airtime))
        .route("/transactions/wallet-topup", post(wallet_topup))
        .route("/accrual/run", post(run_accrual))
}

// =========================================================================
// Ledger operation endpoints
// =========================================================================

async fn transfer(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    execute_operation(pool, OperationKind::Transfer, context, request).await
}

async fn paybill(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    execute_operation(pool, OperationKind::BillPayment, context, request).await
}

async fn buy_goods(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    execute_operation(pool, OperationKind::GoodsPurchase, context, request).await
}

async fn airtime(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    execute_operation(pool, OperationKind::AirtimePurchase, context, request).await
}

async fn wallet_topup(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<TransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    if request.service_provider.is_none() {
        return Err(AppError::InvalidRequest(
            "service_provider is required for wallet top-ups".to_string(),
        ));
    }
    execute_operation(pool, OperationKind::WalletTopUp, context, request).await
}

/// Shared path: build the command, run the ledger, shape the receipt.
async fn execute_operation(
    pool: PgPool,
    kind: OperationKind,
    context: OperationContext,
    request: TransactionRequest,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let mut command = LedgerCommand::new(kind, request.account, request.amount)
        .with_beneficiary(request.beneficiary);
    if let Some(remarks) = request.remarks {
        command = command.with_remarks(remarks);
    }
    if let Some(service_provider) = request.service_provider {
        command = command.with_service_provider(service_provider);
    }

    let ledger = Ledger::new(pool);
    let record = ledger.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

// =========================================================================
// POST /accrual/run
// =========================================================================

/// Manually trigger one accrual cycle. The per-day guard on
/// last_calculation_date makes repeated triggers within the same period
/// no-ops.
async fn run_accrual(
    State(pool): State<PgPool>,
) -> Result<Json<AccrualRunResponse>, AppError> {
    let engine = AccrualEngine::new(pool);
    let report = engine.run_cycle(Utc::now()).await;
    Ok(Json(report.into()))
}
