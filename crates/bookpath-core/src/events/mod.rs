//! Domain events emitted by BookPath operations.
//!
//! Events are recorded through [`record`], which writes them to the
//! `audit` tracing target as structured JSON.

pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use user::UserEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: UserEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: UserEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}

/// Writes an event to the audit log target.
pub fn record(event: &DomainEvent) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(
            target: "audit",
            event_id = %event.id,
            user_id = %event.payload.user_id(),
            event = %json,
            "Audit event"
        ),
        Err(e) => tracing::error!(target: "audit", error = %e, "Failed to serialize audit event"),
    }
}
