//! Ledger commands and transaction records
//!
//! Commands are the caller's intent; transaction records are the immutable
//! receipts appended alongside the balance mutation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money-movement operation variants, each with its own record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Transfer,
    BillPayment,
    GoodsPurchase,
    AirtimePurchase,
    WalletTopUp,
}

impl OperationKind {
    /// Record table for this operation variant.
    pub fn record_table(&self) -> &'static str {
        match self {
            Self::Transfer => "transfers",
            Self::BillPayment => "bill_payments",
            Self::GoodsPurchase => "buy_goods_purchases",
            Self::AirtimePurchase => "airtime_purchases",
            Self::WalletTopUp => "wallet_topups",
        }
    }

    /// Value stored in the record's transaction_type column.
    pub fn transaction_type(&self) -> &'static str {
        match self {
            Self::Transfer => "c2b_transfer",
            Self::BillPayment => "paybill",
            Self::GoodsPurchase => "buy_goods_and_services",
            Self::AirtimePurchase => "airtime",
            Self::WalletTopUp => "wallet_topup",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.transaction_type())
    }
}

/// Command to execute a money-movement operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerCommand {
    pub kind: OperationKind,
    /// Source account/contract number to debit
    pub account_no: String,
    /// Raw amount; validated inside the ledger after the existence check
    pub amount: Decimal,
    /// Receiving party (payee, till, phone number, store)
    pub beneficiary: String,
    pub remarks: Option<String>,
    /// Wallet top-ups carry the receiving service provider
    pub service_provider: Option<String>,
}

impl LedgerCommand {
    pub fn new(kind: OperationKind, account_no: String, amount: Decimal) -> Self {
        Self {
            kind,
            account_no,
            amount,
            beneficiary: String::new(),
            remarks: None,
            service_provider: None,
        }
    }

    pub fn with_beneficiary(mut self, beneficiary: String) -> Self {
        self.beneficiary = beneficiary;
        self
    }

    pub fn with_remarks(mut self, remarks: String) -> Self {
        self.remarks = Some(remarks);
        self
    }

    pub fn with_service_provider(mut self, service_provider: String) -> Self {
        self.service_provider = Some(service_provider);
        self
    }
}

/// An append-only ledger entry, returned to the caller as the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub ref_no: String,
    pub transaction_type: String,
    pub account_no: String,
    pub amount: Decimal,
    pub currency: String,
    pub beneficiary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    pub owner_customer_no: i64,
    pub date_posted: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_table_per_kind() {
        assert_eq!(OperationKind::Transfer.record_table(), "transfers");
        assert_eq!(OperationKind::BillPayment.record_table(), "bill_payments");
        assert_eq!(
            OperationKind::GoodsPurchase.record_table(),
            "buy_goods_purchases"
        );
        assert_eq!(
            OperationKind::AirtimePurchase.record_table(),
            "airtime_purchases"
        );
        assert_eq!(OperationKind::WalletTopUp.record_table(), "wallet_topups");
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(OperationKind::Transfer.transaction_type(), "c2b_transfer");
        assert_eq!(
            OperationKind::GoodsPurchase.transaction_type(),
            "buy_goods_and_services"
        );
    }

    #[test]
    fn test_operation_kind_serde() {
        let kind: OperationKind = serde_json::from_str(r#""wallet_top_up""#).unwrap();
        assert_eq!(kind, OperationKind::WalletTopUp);
    }
}
