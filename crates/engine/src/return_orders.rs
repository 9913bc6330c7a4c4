//! Return orders (B.D — "Bon de retour").
//!
//! Reconciling a driver's trip splits what came back into disjoint buckets —
//! returned empties, returned fulls, consignment sales, losses, foreign
//! bottles, defects — and fans the result out to the empty/defective/foreign
//! ledgers, the catalog, and the driver's R.C map in one synchronous command.
//!
//! Buckets may legitimately exceed what the linked trip supplied (drivers
//! carry stock across trips), so over-accounting is a warning, never a
//! rejection. An item whose bottle type has been deleted from the catalog is
//! skipped whole; applying only part of its effects would break conservation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConsistencyWarning, Engine, EngineError, ResultEngine,
    commands::ReturnOrderCmd,
    util::normalize_optional_text,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOrderItem {
    pub bottle_type_id: Uuid,
    pub returned_empty_quantity: u32,
    pub returned_full_quantity: u32,
    pub consigne_quantity: u32,
    pub lost_quantity: u32,
    pub foreign_quantity: u32,
    pub defective_quantity: u32,
    pub foreign_company: Option<String>,
}

impl ReturnOrderItem {
    /// Net change to the empty pool: consignment, lost, and foreign-retained
    /// empties never reach depot stock even though they were physically
    /// empty.
    pub fn empty_delta(&self) -> i64 {
        i64::from(self.returned_empty_quantity)
            - i64::from(self.consigne_quantity)
            - i64::from(self.lost_quantity)
            - i64::from(self.foreign_quantity)
    }

    /// Sum of the buckets that account for supplied bottles.
    pub fn accounted(&self) -> u32 {
        self.returned_empty_quantity
            + self.returned_full_quantity
            + self.consigne_quantity
            + self.lost_quantity
            + self.foreign_quantity
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOrder {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub driver_id: Uuid,
    /// The trip this order reconciles, when one was linked.
    pub supply_order_id: Option<Uuid>,
    pub items: Vec<ReturnOrderItem>,
}

/// Result of creating a return order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnOrderOutcome {
    pub order: ReturnOrder,
    pub warnings: Vec<ConsistencyWarning>,
    /// Bottle types whose items were skipped whole because the catalog no
    /// longer knows them.
    pub skipped: Vec<Uuid>,
}

impl Engine {
    /// Reconciles a driver's return trip.
    ///
    /// The driver (and the linked supply order, when given) must exist —
    /// hard rejections before any mutation. Per item, the fan-out applies
    /// the empty-pool delta, credits returned fulls back to the catalog,
    /// adds defects and foreign bottles to their ledgers, and adjusts the
    /// driver's R.C by what the trip supplied minus what the buckets
    /// account for. All R.C changes of one order form a single history
    /// entry.
    pub fn create_return_order(&mut self, cmd: ReturnOrderCmd) -> ResultEngine<ReturnOrderOutcome> {
        self.driver(cmd.driver_id)?;
        let supplied_by_type: BTreeMap<Uuid, u32> = match cmd.supply_order_id {
            Some(supply_order_id) => {
                let order = self.supply_order(supply_order_id)?;
                order.items.iter().fold(BTreeMap::new(), |mut acc, item| {
                    *acc.entry(item.bottle_type_id).or_default() += item.full_quantity;
                    acc
                })
            }
            None => BTreeMap::new(),
        };
        if cmd.items.iter().all(|item| item.is_empty()) {
            return Err(EngineError::InvalidOrder(
                "order carries no movement".to_string(),
            ));
        }

        let order_id = Uuid::new_v4();
        let date = cmd.date;
        let mut warnings = Vec::new();
        let mut skipped = Vec::new();
        let mut items = Vec::new();
        let mut rc_deltas: Vec<(Uuid, i64)> = Vec::new();

        for input in cmd.items {
            if input.is_empty() {
                continue;
            }
            let bottle_type_id = input.bottle_type_id;
            if self.bottle_type(bottle_type_id).is_err() {
                tracing::warn!(%bottle_type_id, "skipping return item for unknown bottle type");
                skipped.push(bottle_type_id);
                continue;
            }

            let item = ReturnOrderItem {
                bottle_type_id,
                returned_empty_quantity: input.returned_empty_quantity,
                returned_full_quantity: input.returned_full_quantity,
                consigne_quantity: input.consigne_quantity,
                lost_quantity: input.lost_quantity,
                foreign_quantity: input.foreign_quantity,
                defective_quantity: input.defective_quantity,
                foreign_company: normalize_optional_text(input.foreign_company.as_deref()),
            };

            let empty_delta = item.empty_delta();
            if empty_delta != 0 {
                let (history, warning) =
                    self.empty_stock.apply_return(bottle_type_id, empty_delta, date);
                self.history.record(history)?;
                warnings.extend(warning);
            }

            if item.returned_full_quantity > 0 {
                let bottle_type = self.bottle_type_mut(bottle_type_id)?;
                bottle_type.adjust_distribution(-i64::from(item.returned_full_quantity));
            }

            if item.defective_quantity > 0 {
                let history = self.defective_stock.add(
                    bottle_type_id,
                    item.defective_quantity,
                    Some(format!("B.D {order_id}")),
                    date,
                );
                self.history.record(history)?;
            }

            if item.foreign_quantity > 0 {
                self.foreign_bottles.add_from_return(
                    item.foreign_company.clone(),
                    bottle_type_id,
                    item.foreign_quantity,
                    order_id,
                    date,
                );
            }

            let supplied = supplied_by_type.get(&bottle_type_id).copied();
            let accounted = item.accounted();
            if let Some(supplied) = supplied
                && accounted > supplied
            {
                warnings.push(ConsistencyWarning::OverAccounted {
                    bottle_type_id,
                    supplied,
                    accounted,
                });
            }
            let rc_delta = i64::from(supplied.unwrap_or(0)) - i64::from(accounted);
            if rc_delta != 0 {
                rc_deltas.push((bottle_type_id, rc_delta));
            }

            items.push(item);
        }

        let driver = self.driver_mut(cmd.driver_id)?;
        let mut changes = Vec::new();
        for (bottle_type_id, delta) in rc_deltas {
            let (change, warning) = driver.apply_delta(bottle_type_id, delta);
            changes.extend(change);
            warnings.extend(warning);
        }
        driver.push_rc_entry(date, changes);

        let order = ReturnOrder {
            id: order_id,
            date,
            driver_id: cmd.driver_id,
            supply_order_id: cmd.supply_order_id,
            items,
        };
        self.return_orders.push(order.clone());
        self.persist()?;
        Ok(ReturnOrderOutcome {
            order,
            warnings,
            skipped,
        })
    }

    pub fn return_orders(&self) -> &[ReturnOrder] {
        &self.return_orders
    }

    pub fn return_order(&self, id: Uuid) -> ResultEngine<&ReturnOrder> {
        self.return_orders
            .iter()
            .find(|order| order.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }
}
