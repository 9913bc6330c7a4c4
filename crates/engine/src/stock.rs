//! Quantity pools for empty and defective bottles.
//!
//! Both pools share the [`StockLedger`] shape but live under separate
//! [`StockKind`] keyspaces. Every mutation produces exactly one audit entry;
//! removals that would go negative are floored at zero, and the clamp is
//! surfaced as a [`ConsistencyWarning`] while staying visible in the audit
//! trail through the recorded previous/new pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConsistencyWarning, Engine, EngineError, ResultEngine,
    history::{ChangeKind, StockHistoryEntry, StockKind},
    util::{normalize_optional_text, require_positive_quantity},
};

/// Per-bottle-type quantity in one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub bottle_type_id: Uuid,
    pub quantity: u32,
    pub last_updated: DateTime<Utc>,
}

/// One quantity pool (empty or defective), keyed by bottle type.
#[derive(Clone, Debug, PartialEq)]
pub struct StockLedger {
    kind: StockKind,
    entries: Vec<StockEntry>,
}

impl StockLedger {
    pub(crate) fn new(kind: StockKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub(crate) fn from_entries(kind: StockKind, entries: Vec<StockEntry>) -> Self {
        Self { kind, entries }
    }

    pub fn kind(&self) -> StockKind {
        self.kind
    }

    pub fn entries(&self) -> &[StockEntry] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<StockEntry> {
        self.entries
    }

    pub fn quantity(&self, bottle_type_id: Uuid) -> u32 {
        self.entries
            .iter()
            .find(|e| e.bottle_type_id == bottle_type_id)
            .map_or(0, |e| e.quantity)
    }

    fn entry_mut(&mut self, bottle_type_id: Uuid, now: DateTime<Utc>) -> &mut StockEntry {
        match self
            .entries
            .iter()
            .position(|e| e.bottle_type_id == bottle_type_id)
        {
            Some(index) => &mut self.entries[index],
            None => {
                self.entries.push(StockEntry {
                    bottle_type_id,
                    quantity: 0,
                    last_updated: now,
                });
                let index = self.entries.len() - 1;
                &mut self.entries[index]
            }
        }
    }

    /// Credits whole units into the pool.
    pub(crate) fn add(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> StockHistoryEntry {
        let kind = self.kind;
        let entry = self.entry_mut(bottle_type_id, now);
        let previous = entry.quantity;
        entry.quantity += quantity;
        entry.last_updated = now;
        StockHistoryEntry::new(
            now,
            bottle_type_id,
            kind,
            ChangeKind::Add,
            previous,
            entry.quantity,
            note,
        )
    }

    /// Debits whole units, flooring at zero.
    pub(crate) fn remove(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> (StockHistoryEntry, Option<ConsistencyWarning>) {
        let kind = self.kind;
        let entry = self.entry_mut(bottle_type_id, now);
        let previous = entry.quantity;
        entry.quantity = previous.saturating_sub(quantity);
        entry.last_updated = now;

        let warning = (quantity > previous).then_some(ConsistencyWarning::NegativeClamped {
            stock: kind,
            bottle_type_id,
            previous,
            requested: -i64::from(quantity),
        });
        let history = StockHistoryEntry::new(
            now,
            bottle_type_id,
            kind,
            ChangeKind::Remove,
            previous,
            entry.quantity,
            note,
        );
        (history, warning)
    }

    /// Applies a signed reconciliation delta from a return trip.
    ///
    /// Negative deltas happen when consignment/lost/foreign empties exceed
    /// what physically came back; the pool floors at zero.
    pub(crate) fn apply_return(
        &mut self,
        bottle_type_id: Uuid,
        delta: i64,
        now: DateTime<Utc>,
    ) -> (StockHistoryEntry, Option<ConsistencyWarning>) {
        let kind = self.kind;
        let entry = self.entry_mut(bottle_type_id, now);
        let previous = entry.quantity;
        let target = i64::from(previous) + delta;
        entry.quantity = target.max(0) as u32;
        entry.last_updated = now;

        let warning = (target < 0).then_some(ConsistencyWarning::NegativeClamped {
            stock: kind,
            bottle_type_id,
            previous,
            requested: delta,
        });
        let history = StockHistoryEntry::new(
            now,
            bottle_type_id,
            kind,
            ChangeKind::Return,
            previous,
            entry.quantity,
            None,
        );
        (history, warning)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Outcome of a manual stock adjustment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub bottle_type_id: Uuid,
    /// Pool quantity after the adjustment.
    pub quantity: u32,
    pub warnings: Vec<ConsistencyWarning>,
}

impl Engine {
    pub fn add_empty_stock(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<&str>,
    ) -> ResultEngine<StockUpdate> {
        self.adjust_stock(StockKind::Empty, ChangeKind::Add, bottle_type_id, quantity, note)
    }

    pub fn remove_empty_stock(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<&str>,
    ) -> ResultEngine<StockUpdate> {
        self.adjust_stock(
            StockKind::Empty,
            ChangeKind::Remove,
            bottle_type_id,
            quantity,
            note,
        )
    }

    pub fn add_defective_stock(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<&str>,
    ) -> ResultEngine<StockUpdate> {
        self.adjust_stock(
            StockKind::Defective,
            ChangeKind::Add,
            bottle_type_id,
            quantity,
            note,
        )
    }

    pub fn remove_defective_stock(
        &mut self,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<&str>,
    ) -> ResultEngine<StockUpdate> {
        self.adjust_stock(
            StockKind::Defective,
            ChangeKind::Remove,
            bottle_type_id,
            quantity,
            note,
        )
    }

    fn adjust_stock(
        &mut self,
        stock: StockKind,
        change: ChangeKind,
        bottle_type_id: Uuid,
        quantity: u32,
        note: Option<&str>,
    ) -> ResultEngine<StockUpdate> {
        self.bottle_type(bottle_type_id)?;
        require_positive_quantity(quantity, "stock quantity")?;
        let note = normalize_optional_text(note);
        let now = Utc::now();

        let ledger = match stock {
            StockKind::Empty => &mut self.empty_stock,
            StockKind::Defective => &mut self.defective_stock,
        };
        let (history, warning) = match change {
            ChangeKind::Add => (ledger.add(bottle_type_id, quantity, note, now), None),
            ChangeKind::Remove => ledger.remove(bottle_type_id, quantity, note, now),
            ChangeKind::Return => {
                return Err(EngineError::InvalidQuantity(
                    "returns are applied by return orders".to_string(),
                ));
            }
        };
        let new_quantity = history.new_quantity;
        self.history.record(history)?;
        self.persist()?;

        Ok(StockUpdate {
            bottle_type_id,
            quantity: new_quantity,
            warnings: warning.into_iter().collect(),
        })
    }

    pub fn empty_stock(&self) -> &[StockEntry] {
        self.empty_stock.entries()
    }

    pub fn defective_stock(&self) -> &[StockEntry] {
        self.defective_stock.entries()
    }

    pub fn stock_history(&self) -> &[StockHistoryEntry] {
        self.history.entries()
    }
}
