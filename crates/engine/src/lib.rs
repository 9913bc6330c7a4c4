//! Bottle-stock ledger and reconciliation engine for a bottled-gas
//! distribution depot.
//!
//! The [`Engine`] owns every ledger — the bottle-type catalog, the empty and
//! defective pools, the foreign-bottle ledger, per-driver possession (R.C) —
//! plus the order histories and the append-only stock audit trail. Commands
//! fan out across ledgers synchronously: either a command fails validation
//! before touching anything, or all of its sub-mutations complete. The
//! engine is single-writer by design; callers serialize access.
//!
//! State is held in memory and written through to a [`SnapshotStore`] (one
//! flat JSON snapshot) after every successful command.

use crate::{
    foreign::ForeignBottleLedger,
    history::StockHistoryRecorder,
    stock::StockLedger,
};

pub use bottle_types::{BottleType, BottleTypePatch};
pub use commands::{ExchangeCmd, ReturnItemInput, ReturnOrderCmd, SupplyItemInput, SupplyOrderCmd};
pub use drivers::{Driver, RcChange, RcHistoryEntry};
pub use error::{ConsistencyWarning, EngineError};
pub use exchanges::ExchangeRecord;
pub use foreign::{ForeignBottleEntry, ForeignEntryKind, ForeignTotalRow, UNBRANDED_COMPANY};
pub use history::{ChangeKind, StockHistoryEntry, StockKind};
pub use impact::{ImpactTotals, ImpactWindow};
pub use money::MoneyCents;
pub use return_orders::{ReturnOrder, ReturnOrderItem, ReturnOrderOutcome};
pub use snapshot::Snapshot;
pub use stock::{StockEntry, StockUpdate};
pub use storage::{SnapshotStore, StorageError};
pub use supply_orders::{SupplyOrder, SupplyOrderItem, SupplyOrderOutcome, TAX_RATE_PERCENT};

mod bottle_types;
mod commands;
mod drivers;
mod error;
mod exchanges;
mod foreign;
mod history;
mod impact;
mod money;
mod return_orders;
mod snapshot;
mod stock;
mod storage;
mod supply_orders;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// Single owner of all ledger state.
#[derive(Debug)]
pub struct Engine {
    bottle_types: Vec<BottleType>,
    drivers: Vec<Driver>,
    supply_orders: Vec<SupplyOrder>,
    return_orders: Vec<ReturnOrder>,
    exchanges: Vec<ExchangeRecord>,
    empty_stock: StockLedger,
    defective_stock: StockLedger,
    foreign_bottles: ForeignBottleLedger,
    history: StockHistoryRecorder,
    store: Option<SnapshotStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Writes the current snapshot through to the store, when one is
    /// configured.
    fn persist(&self) -> ResultEngine<()> {
        if let Some(store) = &self.store {
            store.save(&self.export_snapshot())?;
        }
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<SnapshotStore>,
}

impl EngineBuilder {
    /// Attach a snapshot store; state is loaded from it and written through
    /// after every successful command.
    #[must_use]
    pub fn store(mut self, store: SnapshotStore) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let mut engine = Engine {
            bottle_types: Vec::new(),
            drivers: Vec::new(),
            supply_orders: Vec::new(),
            return_orders: Vec::new(),
            exchanges: Vec::new(),
            empty_stock: StockLedger::new(StockKind::Empty),
            defective_stock: StockLedger::new(StockKind::Defective),
            foreign_bottles: ForeignBottleLedger::default(),
            history: StockHistoryRecorder::default(),
            store: self.store,
        };

        if let Some(store) = &engine.store
            && let Some(snapshot) = store.load()?
        {
            engine.apply_snapshot(snapshot);
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_store_starts_empty() {
        let engine = Engine::builder().build().unwrap();
        assert!(engine.bottle_types().is_empty());
        assert!(engine.drivers().is_empty());
        assert!(engine.stock_history().is_empty());
    }
}
