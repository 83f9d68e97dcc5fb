//! Balance Holder
//!
//! A balance holder is any account-like entity with a mutable monetary
//! balance: deposit accounts, loans (spending against the undrawn
//! `disposable_amount`) and term deposits. Each variant lives in its own
//! storage table with its own name for "the balance", so the variants are
//! modelled as a tagged enum and dispatch happens here rather than in the
//! repository's SQL.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Amount, DomainError};

/// Balance holder variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
    DepositAccount,
    CorporateAccount,
    PersonalLoan,
    BusinessLoan,
    Mortgage,
    TermDeposit,
}

impl HolderKind {
    /// Storage table for this variant.
    pub fn table(&self) -> &'static str {
        match self {
            Self::DepositAccount => "personal_accounts",
            Self::CorporateAccount => "corporate_accounts",
            Self::PersonalLoan => "personal_loans",
            Self::BusinessLoan => "business_loans",
            Self::Mortgage => "mortgages",
            Self::TermDeposit => "term_deposits",
        }
    }

    /// Column holding the spendable balance, if the variant is spendable.
    /// Loans spend against the undrawn portion, never the outstanding debt.
    pub fn spendable_column(&self) -> Option<&'static str> {
        match self {
            Self::DepositAccount | Self::CorporateAccount => Some("account_balance"),
            Self::PersonalLoan | Self::BusinessLoan | Self::Mortgage => {
                Some("disposable_amount")
            }
            Self::TermDeposit => None,
        }
    }

    pub fn is_loan(&self) -> bool {
        matches!(self, Self::PersonalLoan | Self::BusinessLoan | Self::Mortgage)
    }

    /// Fixed lookup precedence for ledger operations: deposit accounts
    /// first, then corporate accounts, then the loan variants. Term
    /// deposits are never spendable and are not probed.
    pub fn ledger_lookup_order() -> &'static [HolderKind] {
        &[
            Self::DepositAccount,
            Self::CorporateAccount,
            Self::PersonalLoan,
            Self::BusinessLoan,
            Self::Mortgage,
        ]
    }
}

impl fmt::Display for HolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DepositAccount => "deposit_account",
            Self::CorporateAccount => "corporate_account",
            Self::PersonalLoan => "personal_loan",
            Self::BusinessLoan => "business_loan",
            Self::Mortgage => "mortgage",
            Self::TermDeposit => "term_deposit",
        };
        write!(f, "{}", s)
    }
}

/// Holder lifecycle status. Transitions are one-directional; a closed or
/// liquidated holder is never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HolderStatus {
    Pending,
    InReview,
    Active,
    Closed,
    Liquidated,
}

impl HolderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in-review",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Liquidated => "liquidated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in-review" => Some(Self::InReview),
            "active" | "open" => Some(Self::Active),
            "closed" => Some(Self::Closed),
            "liquidated" => Some(Self::Liquidated),
            _ => None,
        }
    }

    /// Only active holders are debitable and accrue interest.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for HolderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A balance holder row as loaded (and locked) by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceHolder {
    pub kind: HolderKind,
    pub account_no: String,
    pub owner_customer_no: i64,
    pub currency: String,
    pub status: HolderStatus,
    /// Value of the variant's spendable column at lock time.
    pub spendable: Decimal,
}

impl BalanceHolder {
    /// Check the holder can be debited by `amount`.
    pub fn check_debit(&self, amount: &Amount) -> Result<(), DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::HolderNotActive {
                account_no: self.account_no.clone(),
                status: self.status.to_string(),
            });
        }
        if self.spendable < amount.value() {
            return Err(DomainError::insufficient_funds(
                amount.value(),
                self.spendable,
            ));
        }
        Ok(())
    }
}
