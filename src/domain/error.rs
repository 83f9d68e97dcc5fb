//! Domain Error Types
//!
//! Business rule violations, independent of the web/infrastructure layer.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by ledger and accrual business rules.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Referenced account/contract does not exist in any holder table
    #[error("Balance holder not found: {0}")]
    HolderNotFound(String),

    /// Non-positive or malformed operation amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Spendable balance too low for the requested debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// Holder is not in a state that permits the operation
    #[error("Holder {account_no} is not active (status: {status})")]
    HolderNotActive { account_no: String, status: String },

    /// Row lock could not be acquired within the bounded timeout
    #[error("Concurrent update contention on holder {0}")]
    LockContention(String),
}

impl DomainError {
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Client errors are the caller's fault and not retryable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::HolderNotFound(_)
                | Self::InvalidAmount(_)
                | Self::InsufficientFunds { .. }
                | Self::HolderNotActive { .. }
        )
    }

    /// Contention errors may succeed if the caller retries with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockContention(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(dec!(600), dec!(400));

        assert!(err.is_client_error());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("600"));
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_lock_contention_retryable() {
        let err = DomainError::LockContention("ACC-1".to_string());

        assert!(!err.is_client_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_is_client_error() {
        let err = DomainError::HolderNotFound("missing".to_string());
        assert!(err.is_client_error());
    }
}
