//! Flat, serializable snapshot of the whole ledger state.
//!
//! The snapshot is the only durable contract with storage: export produces
//! the full state, import replaces it wholesale (no partial merge). Every
//! collection is a `Vec` in insertion order so serialization is
//! deterministic and an export/import cycle is byte-for-byte stable.

use serde::{Deserialize, Serialize};

use crate::{
    Engine, ResultEngine,
    bottle_types::BottleType,
    drivers::Driver,
    exchanges::ExchangeRecord,
    foreign::{ForeignBottleEntry, ForeignBottleLedger},
    history::{StockHistoryEntry, StockHistoryRecorder, StockKind},
    return_orders::ReturnOrder,
    stock::{StockEntry, StockLedger},
    supply_orders::SupplyOrder,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub bottle_types: Vec<BottleType>,
    pub drivers: Vec<Driver>,
    pub supply_orders: Vec<SupplyOrder>,
    pub return_orders: Vec<ReturnOrder>,
    pub exchanges: Vec<ExchangeRecord>,
    pub empty_stock: Vec<StockEntry>,
    pub defective_stock: Vec<StockEntry>,
    pub foreign_bottles: Vec<ForeignBottleEntry>,
    pub stock_history: Vec<StockHistoryEntry>,
}

impl Engine {
    /// Produces the full state snapshot.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot {
            bottle_types: self.bottle_types.clone(),
            drivers: self.drivers.clone(),
            supply_orders: self.supply_orders.clone(),
            return_orders: self.return_orders.clone(),
            exchanges: self.exchanges.clone(),
            empty_stock: self.empty_stock.entries().to_vec(),
            defective_stock: self.defective_stock.entries().to_vec(),
            foreign_bottles: self.foreign_bottles.entries().to_vec(),
            stock_history: self.history.entries().to_vec(),
        }
    }

    /// Replaces the whole state with `snapshot` and persists it.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> ResultEngine<()> {
        self.apply_snapshot(snapshot);
        self.persist()
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.bottle_types = snapshot.bottle_types;
        self.drivers = snapshot.drivers;
        self.supply_orders = snapshot.supply_orders;
        self.return_orders = snapshot.return_orders;
        self.exchanges = snapshot.exchanges;
        self.empty_stock = StockLedger::from_entries(StockKind::Empty, snapshot.empty_stock);
        self.defective_stock =
            StockLedger::from_entries(StockKind::Defective, snapshot.defective_stock);
        self.foreign_bottles = ForeignBottleLedger::from_entries(snapshot.foreign_bottles);
        self.history = StockHistoryRecorder::from_entries(snapshot.stock_history);
    }

    /// Zeroes every quantity pool while keeping definitions and records.
    ///
    /// Bottle-type counters, stock pools, foreign entries, and driver
    /// possession reset to zero; bottle types, drivers, order history, and
    /// the append-only audit trail stay.
    pub fn clear_all_inventory(&mut self) -> ResultEngine<()> {
        for bottle_type in &mut self.bottle_types {
            bottle_type.reset_quantities();
        }
        self.empty_stock.clear();
        self.defective_stock.clear();
        self.foreign_bottles.clear();
        for driver in &mut self.drivers {
            driver.remaining_bottles.clear();
        }
        self.persist()
    }
}
