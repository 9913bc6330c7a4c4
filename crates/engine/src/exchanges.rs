//! Brand-to-brand bottle exchanges settled by a price difference.
//!
//! An exchange is a negotiated financial/quantity event recorded outside the
//! supply/return cycle. It does not touch the foreign-bottle ledger: the
//! physical transfer is confirmed separately through a manual stock entry
//! once the trade actually happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Engine, EngineError, MoneyCents, ResultEngine,
    commands::ExchangeCmd,
    util::{normalize_optional_text, normalize_required_name},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub company_name: String,
    pub client_name: Option<String>,
    pub bottle_type_id: Uuid,
    pub quantity_given: u32,
    pub quantity_received: u32,
    /// Always the non-negative magnitude; the direction lives in
    /// `is_paid_by_us`.
    pub price_difference: MoneyCents,
    /// True when we gave away more value than we received.
    pub is_paid_by_us: bool,
    pub paid_by: Option<String>,
}

impl Engine {
    /// Records an exchange with a partner brand.
    ///
    /// The unit price defaults to the bottle type's catalog price;
    /// `price_difference = |received − given| × unit_price`.
    pub fn create_exchange(&mut self, cmd: ExchangeCmd) -> ResultEngine<ExchangeRecord> {
        let company_name = normalize_required_name(&cmd.company_name, "company name")?;
        let bottle_type = self.bottle_type(cmd.bottle_type_id)?;
        if cmd.quantity_given == 0 && cmd.quantity_received == 0 {
            return Err(EngineError::InvalidQuantity(
                "exchange moves no bottles".to_string(),
            ));
        }

        let unit_price = cmd.unit_price.unwrap_or(bottle_type.unit_price);
        let value_delta =
            (i64::from(cmd.quantity_received) - i64::from(cmd.quantity_given)) * unit_price.cents();

        let record = ExchangeRecord {
            id: Uuid::new_v4(),
            date: cmd.date,
            company_name,
            client_name: normalize_optional_text(cmd.client_name.as_deref()),
            bottle_type_id: cmd.bottle_type_id,
            quantity_given: cmd.quantity_given,
            quantity_received: cmd.quantity_received,
            price_difference: MoneyCents::new(value_delta).abs(),
            is_paid_by_us: value_delta < 0,
            paid_by: normalize_optional_text(cmd.paid_by.as_deref()),
        };

        self.exchanges.push(record.clone());
        self.persist()?;
        Ok(record)
    }

    pub fn exchanges(&self) -> &[ExchangeRecord] {
        &self.exchanges
    }
}
