//! The module contains the error the engine can throw, plus the non-fatal
//! consistency warnings that ride along in command outcomes.
//!
//! Errors reject a command **before** any ledger mutation. Warnings are data:
//! the command completed, but a quantity had to be clamped or a return order
//! accounted for more than its trip supplied. Warnings are never raised as
//! errors because the lenient behavior is intentional (drivers carry stock
//! across trips).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{history::StockKind, storage::StorageError};

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidOrder(a), Self::InvalidOrder(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// A non-fatal finding produced while applying a command.
///
/// The discrepancy stays observable in the audit trail through the recorded
/// `previous_quantity`/`new_quantity` pair; the warning makes it visible to
/// the caller at command time as well.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    /// A stock pool would have gone negative and was floored at zero.
    NegativeClamped {
        stock: StockKind,
        bottle_type_id: Uuid,
        previous: u32,
        requested: i64,
    },
    /// A driver's possession would have gone negative and was floored at zero.
    PossessionClamped {
        driver_id: Uuid,
        bottle_type_id: Uuid,
        previous: u32,
        requested: i64,
    },
    /// A return item's buckets sum to more than the linked trip supplied.
    OverAccounted {
        bottle_type_id: Uuid,
        supplied: u32,
        accounted: u32,
    },
    /// A supply order distributed more than the catalog had remaining.
    DistributionShortfall { bottle_type_id: Uuid, deficit: u32 },
}
