//! Ledger for bottles belonging to competitor brands.
//!
//! Foreign stock only ever grows through this ledger: either a manual direct
//! entry, or a driver coming back from a trip with a competitor's bottle.
//! There is deliberately no subtraction operation here — physical counts are
//! reconciled against brand-to-brand exchanges outside this ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Engine, EngineError, ResultEngine, util::normalize_required_name};

/// Placeholder company for return items that did not name the brand.
pub const UNBRANDED_COMPANY: &str = "-";

/// How a foreign entry came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignEntryKind {
    /// Direct manual stock entry.
    Normal,
    /// Created while reconciling a return order.
    Return,
}

/// A batch of competitor bottles held at the depot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignBottleEntry {
    pub id: Uuid,
    pub company_name: String,
    /// Catalog type of matching capacity; foreign bottles are tracked by the
    /// size class they swap against.
    pub bottle_type_id: Uuid,
    pub quantity: u32,
    pub kind: ForeignEntryKind,
    pub return_order_id: Option<Uuid>,
    pub date: DateTime<Utc>,
}

/// Aggregated quantity for one (company, bottle type) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignTotalRow {
    pub company_name: String,
    pub bottle_type_id: Uuid,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForeignBottleLedger {
    entries: Vec<ForeignBottleEntry>,
}

impl ForeignBottleLedger {
    pub(crate) fn from_entries(entries: Vec<ForeignBottleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ForeignBottleEntry] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<ForeignBottleEntry> {
        self.entries
    }

    pub(crate) fn add_direct(
        &mut self,
        company_name: String,
        bottle_type_id: Uuid,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> &ForeignBottleEntry {
        self.push(ForeignBottleEntry {
            id: Uuid::new_v4(),
            company_name,
            bottle_type_id,
            quantity,
            kind: ForeignEntryKind::Normal,
            return_order_id: None,
            date: now,
        })
    }

    pub(crate) fn add_from_return(
        &mut self,
        company_name: Option<String>,
        bottle_type_id: Uuid,
        quantity: u32,
        return_order_id: Uuid,
        now: DateTime<Utc>,
    ) -> &ForeignBottleEntry {
        self.push(ForeignBottleEntry {
            id: Uuid::new_v4(),
            company_name: company_name.unwrap_or_else(|| UNBRANDED_COMPANY.to_string()),
            bottle_type_id,
            quantity,
            kind: ForeignEntryKind::Return,
            return_order_id: Some(return_order_id),
            date: now,
        })
    }

    fn push(&mut self, entry: ForeignBottleEntry) -> &ForeignBottleEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Total held per company, across all bottle types.
    pub fn totals_by_company(&self) -> BTreeMap<String, u32> {
        self.entries.iter().fold(BTreeMap::new(), |mut acc, entry| {
            *acc.entry(entry.company_name.clone()).or_default() += entry.quantity;
            acc
        })
    }

    /// Total held per (company, bottle type) pair.
    pub fn totals_by_company_and_type(&self) -> Vec<ForeignTotalRow> {
        let folded: BTreeMap<(String, Uuid), u32> =
            self.entries.iter().fold(BTreeMap::new(), |mut acc, entry| {
                *acc.entry((entry.company_name.clone(), entry.bottle_type_id))
                    .or_default() += entry.quantity;
                acc
            });
        folded
            .into_iter()
            .map(|((company_name, bottle_type_id), quantity)| ForeignTotalRow {
                company_name,
                bottle_type_id,
                quantity,
            })
            .collect()
    }

    /// Grand total per bottle type across all companies.
    pub fn totals_by_type(&self) -> BTreeMap<Uuid, u32> {
        self.entries.iter().fold(BTreeMap::new(), |mut acc, entry| {
            *acc.entry(entry.bottle_type_id).or_default() += entry.quantity;
            acc
        })
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Engine {
    /// Records competitor bottles entering the depot outside any return trip.
    pub fn add_foreign_bottles(
        &mut self,
        company_name: &str,
        bottle_type_id: Uuid,
        quantity: u32,
    ) -> ResultEngine<Uuid> {
        let company_name = normalize_required_name(company_name, "company name")?;
        self.bottle_type(bottle_type_id)?;
        if quantity == 0 {
            return Err(EngineError::InvalidQuantity(
                "foreign quantity must be > 0".to_string(),
            ));
        }

        let id = self
            .foreign_bottles
            .add_direct(company_name, bottle_type_id, quantity, Utc::now())
            .id;
        self.persist()?;
        Ok(id)
    }

    pub fn foreign_bottles(&self) -> &[ForeignBottleEntry] {
        self.foreign_bottles.entries()
    }

    pub fn foreign_totals_by_company(&self) -> BTreeMap<String, u32> {
        self.foreign_bottles.totals_by_company()
    }

    pub fn foreign_totals_by_company_and_type(&self) -> Vec<ForeignTotalRow> {
        self.foreign_bottles.totals_by_company_and_type()
    }

    pub fn foreign_totals_by_type(&self) -> BTreeMap<Uuid, u32> {
        self.foreign_bottles.totals_by_type()
    }
}
