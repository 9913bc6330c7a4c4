//! Wire types shared by the HTTP server and its clients.
//!
//! Everything here is plain serde data; the engine's own types never cross
//! the API boundary directly (except the snapshot, which *is* the wire
//! format).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A non-fatal finding surfaced by a command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    NegativeClamped {
        stock: String,
        bottle_type_id: Uuid,
        previous: u32,
        requested: i64,
    },
    PossessionClamped {
        driver_id: Uuid,
        bottle_type_id: Uuid,
        previous: u32,
        requested: i64,
    },
    OverAccounted {
        bottle_type_id: Uuid,
        supplied: u32,
        accounted: u32,
    },
    DistributionShortfall {
        bottle_type_id: Uuid,
        deficit: u32,
    },
}

pub mod bottle_type {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BottleTypeNew {
        pub name: String,
        pub capacity: String,
        /// Unit price in cents.
        pub unit_price_cents: i64,
        pub total_quantity: u32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BottleTypeUpdate {
        pub name: Option<String>,
        pub capacity: Option<String>,
        pub unit_price_cents: Option<i64>,
        pub total_quantity: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BottleTypeView {
        pub id: Uuid,
        pub name: String,
        pub capacity: String,
        pub unit_price_cents: i64,
        pub total_quantity: u32,
        pub distributed_quantity: u32,
        pub remaining_quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BottleTypeCreated {
        pub id: Uuid,
    }
}

pub mod driver {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DriverNew {
        pub name: String,
        pub truck: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DriverCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DriverView {
        pub id: Uuid,
        pub name: String,
        pub truck: Option<String>,
        /// R.C: bottle type → quantity still held.
        pub remaining_bottles: BTreeMap<Uuid, u32>,
        pub is_override: bool,
        pub last_rc_update: Option<DateTime<Utc>>,
    }

    /// Full manual reset of a driver's possession map.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PossessionOverride {
        pub possession: BTreeMap<Uuid, u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RcChangeView {
        pub bottle_type_id: Uuid,
        pub previous_qty: u32,
        pub new_qty: u32,
        pub diff: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RcHistoryView {
        pub date: DateTime<Utc>,
        pub changes: Vec<RcChangeView>,
    }
}

pub mod supply {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplyItemNew {
        pub bottle_type_id: Uuid,
        #[serde(default)]
        pub empty_quantity: u32,
        #[serde(default)]
        pub full_quantity: u32,
        /// Price override in cents; catalog price when absent.
        pub unit_price_cents: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplyOrderNew {
        pub order_number: String,
        pub date: Option<DateTime<Utc>>,
        pub driver_id: Uuid,
        pub client_id: Option<String>,
        pub items: Vec<SupplyItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplyItemView {
        pub bottle_type_id: Uuid,
        pub empty_quantity: u32,
        pub full_quantity: u32,
        pub unit_price_cents: i64,
        pub amount_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplyOrderView {
        pub id: Uuid,
        pub order_number: String,
        pub date: DateTime<Utc>,
        pub driver_id: Uuid,
        pub client_id: Option<String>,
        pub items: Vec<SupplyItemView>,
        pub subtotal_cents: i64,
        pub tax_cents: i64,
        pub total_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SupplyOrderCreated {
        pub order: SupplyOrderView,
        pub warnings: Vec<Warning>,
    }
}

pub mod returns {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnItemNew {
        pub bottle_type_id: Uuid,
        #[serde(default)]
        pub returned_empty_quantity: u32,
        #[serde(default)]
        pub returned_full_quantity: u32,
        #[serde(default)]
        pub consigne_quantity: u32,
        #[serde(default)]
        pub lost_quantity: u32,
        #[serde(default)]
        pub foreign_quantity: u32,
        #[serde(default)]
        pub defective_quantity: u32,
        pub foreign_company: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnOrderNew {
        pub date: Option<DateTime<Utc>>,
        pub driver_id: Uuid,
        pub supply_order_id: Option<Uuid>,
        pub items: Vec<ReturnItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnItemView {
        pub bottle_type_id: Uuid,
        pub returned_empty_quantity: u32,
        pub returned_full_quantity: u32,
        pub consigne_quantity: u32,
        pub lost_quantity: u32,
        pub foreign_quantity: u32,
        pub defective_quantity: u32,
        pub foreign_company: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnOrderView {
        pub id: Uuid,
        pub date: DateTime<Utc>,
        pub driver_id: Uuid,
        pub supply_order_id: Option<Uuid>,
        pub items: Vec<ReturnItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReturnOrderCreated {
        pub order: ReturnOrderView,
        pub warnings: Vec<Warning>,
        /// Bottle types whose items were skipped (no longer in the catalog).
        pub skipped: Vec<Uuid>,
    }
}

pub mod exchange {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeNew {
        pub date: Option<DateTime<Utc>>,
        pub company_name: String,
        pub client_name: Option<String>,
        pub bottle_type_id: Uuid,
        pub quantity_given: u32,
        pub quantity_received: u32,
        pub unit_price_cents: Option<i64>,
        pub paid_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExchangeView {
        pub id: Uuid,
        pub date: DateTime<Utc>,
        pub company_name: String,
        pub client_name: Option<String>,
        pub bottle_type_id: Uuid,
        pub quantity_given: u32,
        pub quantity_received: u32,
        pub price_difference_cents: i64,
        pub is_paid_by_us: bool,
        pub paid_by: Option<String>,
    }
}

pub mod stock {
    use super::*;

    /// Manual add/remove against the empty or defective pool.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockAdjust {
        pub bottle_type_id: Uuid,
        pub quantity: u32,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockAdjusted {
        pub bottle_type_id: Uuid,
        pub quantity: u32,
        pub warnings: Vec<Warning>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockEntryView {
        pub bottle_type_id: Uuid,
        pub quantity: u32,
        pub last_updated: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockHistoryView {
        pub id: Uuid,
        pub date: DateTime<Utc>,
        pub bottle_type_id: Uuid,
        pub stock: String,
        pub change: String,
        pub quantity: i64,
        pub previous_quantity: u32,
        pub new_quantity: u32,
        pub note: Option<String>,
    }
}

pub mod foreign {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForeignNew {
        pub company_name: String,
        pub bottle_type_id: Uuid,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForeignCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForeignEntryView {
        pub id: Uuid,
        pub company_name: String,
        pub bottle_type_id: Uuid,
        pub quantity: u32,
        pub kind: String,
        pub return_order_id: Option<Uuid>,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CompanyTotal {
        pub company_name: String,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeTotal {
        pub bottle_type_id: Uuid,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PairTotal {
        pub company_name: String,
        pub bottle_type_id: Uuid,
        pub quantity: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForeignTotals {
        pub by_company: Vec<CompanyTotal>,
        pub by_type: Vec<TypeTotal>,
        pub by_company_and_type: Vec<PairTotal>,
    }
}

pub mod impact {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Window {
        Today,
        Last7days,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImpactQuery {
        pub window: Window,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImpactView {
        pub window: Window,
        pub empty_delta: i64,
        pub full_delta: i64,
        pub defective_delta: i64,
        pub foreign_delta: i64,
    }
}
