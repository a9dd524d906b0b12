//! Scheduled Order
//!
//! A one-shot trigger attached to an order. Created active with no job key,
//! receives its key once the scheduler accepts the job, and goes inactive
//! when the job fires or is cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shared::{JobKey, OrderId};

/// One-shot trigger for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOrder {
    order_id: OrderId,
    trigger_time: DateTime<Utc>,
    active: bool,
    job_key: Option<JobKey>,
}

impl ScheduledOrder {
    /// Create an active schedule with no job key yet.
    #[must_use]
    pub const fn new(order_id: OrderId, trigger_time: DateTime<Utc>) -> Self {
        Self {
            order_id,
            trigger_time,
            active: true,
            job_key: None,
        }
    }

    /// Get the scheduled order ID.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Get the trigger instant.
    #[must_use]
    pub const fn trigger_time(&self) -> DateTime<Utc> {
        self.trigger_time
    }

    /// Returns true until the job fires or is cancelled.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Get the scheduler job key, once assigned.
    #[must_use]
    pub const fn job_key(&self) -> Option<&JobKey> {
        self.job_key.as_ref()
    }

    /// Record the key the scheduler registered the job under.
    pub fn assign_job_key(&mut self, key: JobKey) {
        self.job_key = Some(key);
    }

    /// Mark the schedule as fired or cancelled.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
