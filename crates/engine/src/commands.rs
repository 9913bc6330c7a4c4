//! Command structs for engine operations.
//!
//! These types group parameters for the write operations (supply orders,
//! return orders, exchanges), keeping call sites readable and avoiding long
//! argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::MoneyCents;

/// One line of a supply order request.
#[derive(Clone, Debug)]
pub struct SupplyItemInput {
    pub bottle_type_id: Uuid,
    pub empty_quantity: u32,
    pub full_quantity: u32,
    /// Price override; the catalog price is used when absent.
    pub unit_price: Option<MoneyCents>,
}

/// Create a supply order (B.S) dispatching full bottles to a driver.
#[derive(Clone, Debug)]
pub struct SupplyOrderCmd {
    pub order_number: String,
    pub date: DateTime<Utc>,
    pub driver_id: Uuid,
    pub client_id: Option<String>,
    pub items: Vec<SupplyItemInput>,
}

impl SupplyOrderCmd {
    #[must_use]
    pub fn new(order_number: impl Into<String>, driver_id: Uuid, date: DateTime<Utc>) -> Self {
        Self {
            order_number: order_number.into(),
            date,
            driver_id,
            client_id: None,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn item(mut self, bottle_type_id: Uuid, empty_quantity: u32, full_quantity: u32) -> Self {
        self.items.push(SupplyItemInput {
            bottle_type_id,
            empty_quantity,
            full_quantity,
            unit_price: None,
        });
        self
    }

    #[must_use]
    pub fn item_priced(
        mut self,
        bottle_type_id: Uuid,
        empty_quantity: u32,
        full_quantity: u32,
        unit_price: MoneyCents,
    ) -> Self {
        self.items.push(SupplyItemInput {
            bottle_type_id,
            empty_quantity,
            full_quantity,
            unit_price: Some(unit_price),
        });
        self
    }
}

/// One line of a return order request.
#[derive(Clone, Debug, Default)]
pub struct ReturnItemInput {
    pub bottle_type_id: Uuid,
    pub returned_empty_quantity: u32,
    pub returned_full_quantity: u32,
    pub consigne_quantity: u32,
    pub lost_quantity: u32,
    pub foreign_quantity: u32,
    pub defective_quantity: u32,
    /// Brand of the foreign bottles, when the driver could tell.
    pub foreign_company: Option<String>,
}

impl ReturnItemInput {
    #[must_use]
    pub fn new(bottle_type_id: Uuid) -> Self {
        Self {
            bottle_type_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn returned_empty(mut self, quantity: u32) -> Self {
        self.returned_empty_quantity = quantity;
        self
    }

    #[must_use]
    pub fn returned_full(mut self, quantity: u32) -> Self {
        self.returned_full_quantity = quantity;
        self
    }

    #[must_use]
    pub fn consigne(mut self, quantity: u32) -> Self {
        self.consigne_quantity = quantity;
        self
    }

    #[must_use]
    pub fn lost(mut self, quantity: u32) -> Self {
        self.lost_quantity = quantity;
        self
    }

    #[must_use]
    pub fn foreign(mut self, quantity: u32) -> Self {
        self.foreign_quantity = quantity;
        self
    }

    #[must_use]
    pub fn foreign_branded(mut self, quantity: u32, company: impl Into<String>) -> Self {
        self.foreign_quantity = quantity;
        self.foreign_company = Some(company.into());
        self
    }

    #[must_use]
    pub fn defective(mut self, quantity: u32) -> Self {
        self.defective_quantity = quantity;
        self
    }

    /// Sum of the buckets that account for supplied bottles.
    #[must_use]
    pub fn accounted(&self) -> u32 {
        self.returned_empty_quantity
            + self.returned_full_quantity
            + self.consigne_quantity
            + self.lost_quantity
            + self.foreign_quantity
    }

    /// True when the line carries no movement at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounted() == 0 && self.defective_quantity == 0
    }
}

/// Create a return order (B.D) reconciling a driver's trip.
#[derive(Clone, Debug)]
pub struct ReturnOrderCmd {
    pub date: DateTime<Utc>,
    pub driver_id: Uuid,
    /// The trip being reconciled; absent for carried-over stock returns.
    pub supply_order_id: Option<Uuid>,
    pub items: Vec<ReturnItemInput>,
}

impl ReturnOrderCmd {
    #[must_use]
    pub fn new(driver_id: Uuid, date: DateTime<Utc>) -> Self {
        Self {
            date,
            driver_id,
            supply_order_id: None,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn supply_order(mut self, supply_order_id: Uuid) -> Self {
        self.supply_order_id = Some(supply_order_id);
        self
    }

    #[must_use]
    pub fn item(mut self, item: ReturnItemInput) -> Self {
        self.items.push(item);
        self
    }
}

/// Create a brand-to-brand exchange settled by a price difference.
#[derive(Clone, Debug)]
pub struct ExchangeCmd {
    pub date: DateTime<Utc>,
    pub company_name: String,
    pub client_name: Option<String>,
    pub bottle_type_id: Uuid,
    pub quantity_given: u32,
    pub quantity_received: u32,
    /// Price override; the catalog price is used when absent.
    pub unit_price: Option<MoneyCents>,
    pub paid_by: Option<String>,
}

impl ExchangeCmd {
    #[must_use]
    pub fn new(
        company_name: impl Into<String>,
        bottle_type_id: Uuid,
        quantity_given: u32,
        quantity_received: u32,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            company_name: company_name.into(),
            client_name: None,
            bottle_type_id,
            quantity_given,
            quantity_received,
            unit_price: None,
            paid_by: None,
        }
    }

    #[must_use]
    pub fn client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    #[must_use]
    pub fn unit_price(mut self, unit_price: MoneyCents) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    #[must_use]
    pub fn paid_by(mut self, paid_by: impl Into<String>) -> Self {
        self.paid_by = Some(paid_by.into());
        self
    }
}
