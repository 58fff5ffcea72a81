//! Product lifecycle events.
//!
//! The write path of the catalog emits one of these after every product
//! mutation; the sync orchestrator consumes them and keeps the index in step.

use serde::{Deserialize, Serialize};

/// A product mutation in the primary store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductEvent {
    Created { product_id: i64 },
    Updated { product_id: i64 },
    Deleted { product_id: i64 },
}

impl ProductEvent {
    pub fn product_id(&self) -> i64 {
        match self {
            ProductEvent::Created { product_id }
            | ProductEvent::Updated { product_id }
            | ProductEvent::Deleted { product_id } => *product_id,
        }
    }

    /// True for events after which the product should be (re)indexed.
    pub fn is_upsert(&self) -> bool {
        !matches!(self, ProductEvent::Deleted { .. })
    }
}
