//! Order State Machine Service
//!
//! Validates status transitions. Status is monotonic: once an order leaves
//! PENDING it reaches exactly one terminal value and never changes again.

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::value_objects::OrderStatus;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Executing)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Executing, OrderStatus::Placed)
                | (OrderStatus::Executing, OrderStatus::Failed)
        )
    }

    /// Validate a state transition.
    ///
    /// A second claim on an order that is already executing is reported as
    /// [`OrderError::AlreadyExecuting`] so callers can tell a lost race from a
    /// genuinely invalid request.
    pub fn validate_transition(
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            return Ok(());
        }
        if from == OrderStatus::Executing && to == OrderStatus::Executing {
            return Err(OrderError::AlreadyExecuting {
                order_id: order_id.to_string(),
            });
        }
        Err(OrderError::InvalidStateTransition {
            from,
            to,
            reason: Self::transition_error_reason(from, to),
        })
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Placed => format!("Order is already placed, cannot transition to {to}"),
            OrderStatus::Failed => format!("Order already failed, cannot transition to {to}"),
            OrderStatus::Cancelled => format!("Order is cancelled, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }
}
