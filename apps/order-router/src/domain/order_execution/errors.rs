//! Order execution errors.

use thiserror::Error;

use super::value_objects::OrderStatus;

/// Errors that can occur in order execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid state transition attempted.
    #[error("Invalid order state transition: {from} -> {to}: {reason}")]
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Another execution attempt already claimed the order.
    #[error("Order {order_id} is already executing")]
    AlreadyExecuting {
        /// Order ID.
        order_id: String,
    },

    /// Invalid order parameters.
    #[error("Invalid order parameter '{field}': {message}")]
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Order not found.
    #[error("Order not found: {order_id}")]
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Schedule not found.
    #[error("Scheduled order not found: {key}")]
    ScheduleNotFound {
        /// Order ID or job key used for the lookup.
        key: String,
    },

    /// Backing store failure.
    #[error("Order storage error: {0}")]
    Storage(String),
}

impl OrderError {
    /// Shorthand for [`OrderError::InvalidParameters`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = OrderError::AlreadyExecuting {
            order_id: "ord-1".to_string(),
        };
        assert_eq!(err.to_string(), "Order ord-1 is already executing");

        let err = OrderError::invalid("quantity", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid order parameter 'quantity': must be positive"
        );
    }
}
