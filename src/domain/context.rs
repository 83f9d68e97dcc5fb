//! Operation Context
//!
//! Metadata about the current operation for audit and tracing. The
//! authenticated customer number comes from the auth layer upstream of the
//! core; the core only consumes it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for a ledger operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Authenticated customer number (X-Customer-No header upstream)
    pub owner_customer_no: i64,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl OperationContext {
    pub fn new(owner_customer_no: i64) -> Self {
        Self {
            owner_customer_no,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a correlation ID if not present.
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let correlation_id = Uuid::new_v4();
        let context = OperationContext::new(42).with_correlation_id(correlation_id);

        assert_eq!(context.owner_customer_no, 42);
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = OperationContext::new(7);
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));

        let id2 = context.ensure_correlation_id();
        assert_eq!(id, id2);
    }
}
