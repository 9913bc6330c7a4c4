//! Append-only audit log for stock mutations.
//!
//! Every quantity change in the empty or defective pools produces exactly one
//! [`StockHistoryEntry`]. Entries are never edited or deleted once written;
//! corrections are new entries. This is the forensic trail used to
//! reconstruct "why is stock X" after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Which pool an audit entry belongs to.
///
/// The two pools share a shape but have separate keyspaces; they are never
/// merged or cross-credited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Empty,
    Defective,
}

impl StockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Defective => "defective",
        }
    }
}

impl TryFrom<&str> for StockKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "empty" => Ok(Self::Empty),
            "defective" => Ok(Self::Defective),
            other => Err(EngineError::InvalidQuantity(format!(
                "invalid stock kind: {other}"
            ))),
        }
    }
}

/// The business reason behind a stock mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Remove,
    Return,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Return => "return",
        }
    }
}

impl TryFrom<&str> for ChangeKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "return" => Ok(Self::Return),
            other => Err(EngineError::InvalidQuantity(format!(
                "invalid change kind: {other}"
            ))),
        }
    }
}

/// One immutable audit record bracketing a stock mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockHistoryEntry {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub bottle_type_id: Uuid,
    pub stock: StockKind,
    pub change: ChangeKind,
    /// Signed delta actually applied (post-clamping).
    pub quantity: i64,
    pub previous_quantity: u32,
    pub new_quantity: u32,
    pub note: Option<String>,
}

impl StockHistoryEntry {
    pub(crate) fn new(
        date: DateTime<Utc>,
        bottle_type_id: Uuid,
        stock: StockKind,
        change: ChangeKind,
        previous_quantity: u32,
        new_quantity: u32,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            bottle_type_id,
            stock,
            change,
            quantity: i64::from(new_quantity) - i64::from(previous_quantity),
            previous_quantity,
            new_quantity,
            note,
        }
    }
}

/// Append-only recorder over [`StockHistoryEntry`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StockHistoryRecorder {
    entries: Vec<StockHistoryEntry>,
}

impl StockHistoryRecorder {
    pub(crate) fn from_entries(entries: Vec<StockHistoryEntry>) -> Self {
        Self { entries }
    }

    /// Appends an entry after checking it is internally consistent.
    ///
    /// `new_quantity − previous_quantity` must equal the signed `quantity`
    /// delta, and the delta's sign must match the change kind (`add` never
    /// decreases, `remove` never increases; `return` may go either way).
    pub(crate) fn record(&mut self, entry: StockHistoryEntry) -> ResultEngine<&StockHistoryEntry> {
        let implied = i64::from(entry.new_quantity) - i64::from(entry.previous_quantity);
        if implied != entry.quantity {
            return Err(EngineError::InvalidQuantity(format!(
                "history delta {} does not bracket {} -> {}",
                entry.quantity, entry.previous_quantity, entry.new_quantity
            )));
        }
        match entry.change {
            ChangeKind::Add if entry.quantity < 0 => {
                return Err(EngineError::InvalidQuantity(
                    "add entry cannot decrease stock".to_string(),
                ));
            }
            ChangeKind::Remove if entry.quantity > 0 => {
                return Err(EngineError::InvalidQuantity(
                    "remove entry cannot increase stock".to_string(),
                ));
            }
            _ => {}
        }

        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[StockHistoryEntry] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<StockHistoryEntry> {
        self.entries
    }

    /// Replays every entry for one (pool, bottle type) pair in order.
    ///
    /// With a complete trail, the folded quantity equals the pool's current
    /// quantity — the audit-completeness property.
    pub fn replay_quantity(&self, stock: StockKind, bottle_type_id: Uuid) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.stock == stock && e.bottle_type_id == bottle_type_id)
            .fold(0i64, |quantity, entry| quantity + entry.quantity)
            .max(0) as u32
    }

    /// Sum of applied deltas for one (pool, bottle type) pair.
    pub fn total_delta(&self, stock: StockKind, bottle_type_id: Uuid) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.stock == stock && e.bottle_type_id == bottle_type_id)
            .map(|e| e.quantity)
            .sum()
    }
}
