//! Supply orders (B.S — "Bon de Sortie").
//!
//! A supply order dispatches full bottles from the depot to a driver's
//! truck. It is the only path that increases a bottle type's
//! `distributed_quantity`. Orders are immutable once created; corrections
//! happen through new orders, never edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConsistencyWarning, Engine, EngineError, MoneyCents, ResultEngine,
    commands::SupplyOrderCmd,
    util::{normalize_optional_text, normalize_required_name, order_number_key},
};

/// VAT applied to supply order subtotals.
pub const TAX_RATE_PERCENT: i64 = 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyOrderItem {
    pub bottle_type_id: Uuid,
    pub empty_quantity: u32,
    pub full_quantity: u32,
    pub unit_price: MoneyCents,
    /// `full_quantity × unit_price`.
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyOrder {
    pub id: Uuid,
    pub order_number: String,
    pub date: DateTime<Utc>,
    pub driver_id: Uuid,
    pub client_id: Option<String>,
    pub items: Vec<SupplyOrderItem>,
    pub subtotal: MoneyCents,
    pub tax: MoneyCents,
    pub total: MoneyCents,
}

impl SupplyOrder {
    /// Full quantity supplied for one bottle type across the order's items.
    pub fn supplied_full(&self, bottle_type_id: Uuid) -> u32 {
        self.items
            .iter()
            .filter(|item| item.bottle_type_id == bottle_type_id)
            .map(|item| item.full_quantity)
            .sum()
    }
}

/// Result of creating a supply order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyOrderOutcome {
    pub order: SupplyOrder,
    pub warnings: Vec<ConsistencyWarning>,
}

impl Engine {
    /// Creates a supply order and moves the dispatched bottles out of the
    /// depot.
    ///
    /// Validation happens before any mutation: duplicate order numbers
    /// (case-insensitive) are a hard rejection, as are unknown drivers or
    /// bottle types. Items with neither empty nor full quantities are
    /// dropped — they represent no movement. Distributing more than remains
    /// is allowed but flagged.
    pub fn create_supply_order(&mut self, cmd: SupplyOrderCmd) -> ResultEngine<SupplyOrderOutcome> {
        let order_number = normalize_required_name(&cmd.order_number, "order number")?;
        let key = order_number_key(&order_number);
        if self
            .supply_orders
            .iter()
            .any(|order| order_number_key(&order.order_number) == key)
        {
            return Err(EngineError::ExistingKey(order_number));
        }
        self.driver(cmd.driver_id)?;

        let mut items = Vec::with_capacity(cmd.items.len());
        for input in &cmd.items {
            if input.empty_quantity == 0 && input.full_quantity == 0 {
                continue;
            }
            let bottle_type = self.bottle_type(input.bottle_type_id)?;
            let unit_price = input.unit_price.unwrap_or(bottle_type.unit_price);
            items.push(SupplyOrderItem {
                bottle_type_id: input.bottle_type_id,
                empty_quantity: input.empty_quantity,
                full_quantity: input.full_quantity,
                unit_price,
                amount: unit_price.scale(input.full_quantity),
            });
        }
        if items.is_empty() {
            return Err(EngineError::InvalidOrder(
                "order carries no movement".to_string(),
            ));
        }

        let mut warnings = Vec::new();
        for item in &items {
            if item.full_quantity == 0 {
                continue;
            }
            let bottle_type = self.bottle_type_mut(item.bottle_type_id)?;
            if let Some(warning) = bottle_type.adjust_distribution(i64::from(item.full_quantity)) {
                tracing::warn!(
                    bottle_type = %item.bottle_type_id,
                    "supply order distributed past remaining stock"
                );
                warnings.push(warning);
            }
        }

        let subtotal = items
            .iter()
            .fold(MoneyCents::ZERO, |acc, item| acc + item.amount);
        let tax = MoneyCents::new(subtotal.cents() * TAX_RATE_PERCENT / 100);
        let order = SupplyOrder {
            id: Uuid::new_v4(),
            order_number,
            date: cmd.date,
            driver_id: cmd.driver_id,
            client_id: normalize_optional_text(cmd.client_id.as_deref()),
            items,
            subtotal,
            tax,
            total: subtotal + tax,
        };

        self.supply_orders.push(order.clone());
        self.persist()?;
        Ok(SupplyOrderOutcome { order, warnings })
    }

    pub fn supply_orders(&self) -> &[SupplyOrder] {
        &self.supply_orders
    }

    pub fn supply_order(&self, id: Uuid) -> ResultEngine<&SupplyOrder> {
        self.supply_orders
            .iter()
            .find(|order| order.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }
}
