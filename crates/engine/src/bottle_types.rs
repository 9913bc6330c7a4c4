//! Reference data for gas-bottle types.
//!
//! The catalog is the single source of truth for how many bottles of a type
//! exist, how many are out in the field, and how many remain at the depot.
//! Invariant after every mutation: `remaining = total − distributed`, all
//! three non-negative. Distribution beyond the remaining quantity clamps
//! `remaining` at zero and is flagged to the caller rather than silently
//! absorbed; blocking is the caller's decision.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConsistencyWarning, Engine, EngineError, MoneyCents, ResultEngine,
    util::normalize_required_name,
};

/// One gas-bottle type (e.g. "12KG" butane).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleType {
    pub id: Uuid,
    pub name: String,
    /// Capacity label shown on documents ("3KG", "6KG", "12KG", "35KG").
    pub capacity: String,
    pub unit_price: MoneyCents,
    pub total_quantity: u32,
    pub distributed_quantity: u32,
    pub remaining_quantity: u32,
}

impl BottleType {
    pub fn new(name: String, capacity: String, unit_price: MoneyCents, total_quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            capacity,
            unit_price,
            total_quantity,
            distributed_quantity: 0,
            remaining_quantity: total_quantity,
        }
    }

    /// Moves `delta` bottles between depot and field.
    ///
    /// Positive deltas are dispatches, negative deltas are full bottles
    /// coming back. `distributed` is floored at zero on the way down;
    /// `remaining` is recomputed and floored at zero on the way up, with a
    /// shortfall flag when distribution exceeds what remained.
    pub(crate) fn adjust_distribution(&mut self, delta: i64) -> Option<ConsistencyWarning> {
        let mut warning = None;
        if delta > 0 {
            let available = i64::from(self.remaining_quantity);
            if delta > available {
                warning = Some(ConsistencyWarning::DistributionShortfall {
                    bottle_type_id: self.id,
                    deficit: (delta - available) as u32,
                });
            }
        }

        let target = i64::from(self.distributed_quantity) + delta;
        self.distributed_quantity = target.max(0) as u32;
        self.remaining_quantity = self.total_quantity.saturating_sub(self.distributed_quantity);
        warning
    }

    pub(crate) fn reset_quantities(&mut self) {
        self.total_quantity = 0;
        self.distributed_quantity = 0;
        self.remaining_quantity = 0;
    }
}

/// Partial update for a bottle type. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottleTypePatch {
    pub name: Option<String>,
    pub capacity: Option<String>,
    pub unit_price: Option<MoneyCents>,
    pub total_quantity: Option<u32>,
}

impl Engine {
    /// Adds a bottle type to the catalog.
    ///
    /// Names are unique case-insensitively, mirroring order numbers.
    pub fn create_bottle_type(
        &mut self,
        name: &str,
        capacity: &str,
        unit_price: MoneyCents,
        total_quantity: u32,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "bottle type name")?;
        let capacity = normalize_required_name(capacity, "bottle type capacity")?;
        if self
            .bottle_types
            .iter()
            .any(|bt| bt.name.eq_ignore_ascii_case(&name))
        {
            return Err(EngineError::ExistingKey(name));
        }

        let bottle_type = BottleType::new(name, capacity, unit_price, total_quantity);
        let id = bottle_type.id;
        self.bottle_types.push(bottle_type);
        self.persist()?;
        Ok(id)
    }

    /// Applies a partial update; `remaining` is recomputed when `total` moves.
    pub fn update_bottle_type(&mut self, id: Uuid, patch: BottleTypePatch) -> ResultEngine<()> {
        if let Some(name) = &patch.name
            && self
                .bottle_types
                .iter()
                .any(|bt| bt.id != id && bt.name.eq_ignore_ascii_case(name.trim()))
        {
            return Err(EngineError::ExistingKey(name.clone()));
        }

        let bottle_type = self.bottle_type_mut(id)?;
        if let Some(name) = patch.name {
            bottle_type.name = normalize_required_name(&name, "bottle type name")?;
        }
        if let Some(capacity) = patch.capacity {
            bottle_type.capacity = normalize_required_name(&capacity, "bottle type capacity")?;
        }
        if let Some(unit_price) = patch.unit_price {
            bottle_type.unit_price = unit_price;
        }
        if let Some(total_quantity) = patch.total_quantity {
            bottle_type.total_quantity = total_quantity;
            bottle_type.remaining_quantity = total_quantity
                .saturating_sub(bottle_type.distributed_quantity);
        }
        self.persist()
    }

    /// Removes a bottle type definition.
    ///
    /// Orders and audit entries referencing the id are left in place; return
    /// items that mention it afterwards are skipped whole (referential gap).
    pub fn delete_bottle_type(&mut self, id: Uuid) -> ResultEngine<BottleType> {
        match self.bottle_types.iter().position(|bt| bt.id == id) {
            Some(index) => {
                let removed = self.bottle_types.remove(index);
                self.persist()?;
                Ok(removed)
            }
            None => Err(EngineError::KeyNotFound(id.to_string())),
        }
    }

    pub fn bottle_types(&self) -> &[BottleType] {
        &self.bottle_types
    }

    pub fn bottle_type(&self, id: Uuid) -> ResultEngine<&BottleType> {
        self.bottle_types
            .iter()
            .find(|bt| bt.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    pub(crate) fn bottle_type_mut(&mut self, id: Uuid) -> ResultEngine<&mut BottleType> {
        self.bottle_types
            .iter_mut()
            .find(|bt| bt.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }
}
