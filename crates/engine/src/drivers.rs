//! Driver registry and per-driver bottle possession (R.C — "Reste
//! Chauffeur").
//!
//! A driver's R.C map tracks what they are carrying and have not yet
//! returned or sold. Trip reconciliation adjusts it automatically; a physical
//! count can override the whole map. Both paths append to one history stream
//! so an auditor sees a single timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ConsistencyWarning, Engine, EngineError, ResultEngine,
    util::{normalize_optional_text, normalize_required_name},
};

/// One bottle type's movement inside an R.C history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcChange {
    pub bottle_type_id: Uuid,
    pub previous_qty: u32,
    pub new_qty: u32,
    pub diff: i64,
}

/// Timestamped batch of R.C changes (one trip reconciliation or one manual
/// override).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcHistoryEntry {
    pub date: DateTime<Utc>,
    pub changes: Vec<RcChange>,
}

/// A delivery driver and the bottles currently attributed to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub truck: Option<String>,
    /// R.C: bottle type → quantity still held.
    pub remaining_bottles: BTreeMap<Uuid, u32>,
    /// Set when the current map came from a manual physical-count override;
    /// cleared by the next automatic trip delta.
    pub is_override: bool,
    pub last_rc_update: Option<DateTime<Utc>>,
    pub rc_history: Vec<RcHistoryEntry>,
}

impl Driver {
    pub fn new(name: String, truck: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            truck,
            remaining_bottles: BTreeMap::new(),
            is_override: false,
            last_rc_update: None,
            rc_history: Vec::new(),
        }
    }

    /// Applies one signed delta to the map, flooring at zero.
    ///
    /// Returns the change (when the quantity actually moved) without touching
    /// the history stream — callers batch all changes of one command into a
    /// single [`RcHistoryEntry`].
    pub(crate) fn apply_delta(
        &mut self,
        bottle_type_id: Uuid,
        delta: i64,
    ) -> (Option<RcChange>, Option<ConsistencyWarning>) {
        let previous = self
            .remaining_bottles
            .get(&bottle_type_id)
            .copied()
            .unwrap_or(0);
        let target = i64::from(previous) + delta;
        let new = target.max(0) as u32;

        let warning = (target < 0).then_some(ConsistencyWarning::PossessionClamped {
            driver_id: self.id,
            bottle_type_id,
            previous,
            requested: delta,
        });

        if new == previous {
            return (None, warning);
        }
        if new == 0 {
            self.remaining_bottles.remove(&bottle_type_id);
        } else {
            self.remaining_bottles.insert(bottle_type_id, new);
        }
        (
            Some(RcChange {
                bottle_type_id,
                previous_qty: previous,
                new_qty: new,
                diff: i64::from(new) - i64::from(previous),
            }),
            warning,
        )
    }

    /// Records a batch of automatic changes as one history entry.
    pub(crate) fn push_rc_entry(&mut self, date: DateTime<Utc>, changes: Vec<RcChange>) {
        if changes.is_empty() {
            return;
        }
        self.is_override = false;
        self.last_rc_update = Some(date);
        self.rc_history.push(RcHistoryEntry { date, changes });
    }

    /// Replaces the whole map from a physical count.
    pub(crate) fn override_possession(
        &mut self,
        new_map: BTreeMap<Uuid, u32>,
        date: DateTime<Utc>,
    ) -> RcHistoryEntry {
        let mut changes = Vec::new();
        let mut keys: Vec<Uuid> = self.remaining_bottles.keys().copied().collect();
        for key in new_map.keys() {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }

        for bottle_type_id in keys {
            let previous = self
                .remaining_bottles
                .get(&bottle_type_id)
                .copied()
                .unwrap_or(0);
            let new = new_map.get(&bottle_type_id).copied().unwrap_or(0);
            if previous != new {
                changes.push(RcChange {
                    bottle_type_id,
                    previous_qty: previous,
                    new_qty: new,
                    diff: i64::from(new) - i64::from(previous),
                });
            }
        }

        self.remaining_bottles = new_map
            .into_iter()
            .filter(|(_, quantity)| *quantity > 0)
            .collect();
        self.is_override = true;
        self.last_rc_update = Some(date);

        let entry = RcHistoryEntry { date, changes };
        self.rc_history.push(entry.clone());
        entry
    }

    /// History entries sorted date-descending for reporting.
    pub fn rc_history_desc(&self) -> Vec<&RcHistoryEntry> {
        let mut entries: Vec<&RcHistoryEntry> = self.rc_history.iter().collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }
}

impl Engine {
    pub fn create_driver(&mut self, name: &str, truck: Option<&str>) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "driver name")?;
        if self
            .drivers
            .iter()
            .any(|d| d.name.eq_ignore_ascii_case(&name))
        {
            return Err(EngineError::ExistingKey(name));
        }

        let driver = Driver::new(name, normalize_optional_text(truck));
        let id = driver.id;
        self.drivers.push(driver);
        self.persist()?;
        Ok(id)
    }

    /// Removes a driver; their historical orders keep referencing the id.
    pub fn delete_driver(&mut self, id: Uuid) -> ResultEngine<Driver> {
        match self.drivers.iter().position(|d| d.id == id) {
            Some(index) => {
                let removed = self.drivers.remove(index);
                self.persist()?;
                Ok(removed)
            }
            None => Err(EngineError::KeyNotFound(id.to_string())),
        }
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn driver(&self, id: Uuid) -> ResultEngine<&Driver> {
        self.drivers
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    pub(crate) fn driver_mut(&mut self, id: Uuid) -> ResultEngine<&mut Driver> {
        self.drivers
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Replaces a driver's R.C map from a physical count.
    ///
    /// Every referenced bottle type must exist; the override marker is set
    /// and one history entry records the per-type differences.
    pub fn override_driver_possession(
        &mut self,
        driver_id: Uuid,
        new_map: BTreeMap<Uuid, u32>,
    ) -> ResultEngine<RcHistoryEntry> {
        for bottle_type_id in new_map.keys() {
            self.bottle_type(*bottle_type_id)?;
        }

        let driver = self.driver_mut(driver_id)?;
        let entry = driver.override_possession(new_map, Utc::now());
        self.persist()?;
        Ok(entry)
    }

    /// R.C history for one driver, newest first.
    pub fn rc_history(&self, driver_id: Uuid) -> ResultEngine<Vec<RcHistoryEntry>> {
        let driver = self.driver(driver_id)?;
        Ok(driver.rc_history_desc().into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_delta_floors_at_zero() {
        let mut driver = Driver::new("Rachid".to_string(), None);
        let bottle_type_id = Uuid::new_v4();

        let (change, warning) = driver.apply_delta(bottle_type_id, 10);
        assert!(warning.is_none());
        assert_eq!(change.as_ref().map(|c| c.new_qty), Some(10));

        let (change, warning) = driver.apply_delta(bottle_type_id, -15);
        assert!(warning.is_some());
        let change = change.expect("quantity moved");
        assert_eq!((change.previous_qty, change.new_qty, change.diff), (10, 0, -10));
        assert!(driver.remaining_bottles.is_empty());
    }

    #[test]
    fn zero_delta_produces_no_change() {
        let mut driver = Driver::new("Rachid".to_string(), None);
        let (change, warning) = driver.apply_delta(Uuid::new_v4(), 0);
        assert!(change.is_none());
        assert!(warning.is_none());
    }

    #[test]
    fn override_records_one_change_per_moved_type() {
        let mut driver = Driver::new("Rachid".to_string(), None);
        let twelve = Uuid::new_v4();
        let six = Uuid::new_v4();
        driver.remaining_bottles.insert(twelve, 10);
        driver.remaining_bottles.insert(six, 4);

        let mut counted = BTreeMap::new();
        counted.insert(twelve, 40);
        counted.insert(six, 4);
        let entry = driver.override_possession(counted, Utc::now());

        assert_eq!(entry.changes.len(), 1);
        assert_eq!(
            entry.changes[0],
            RcChange {
                bottle_type_id: twelve,
                previous_qty: 10,
                new_qty: 40,
                diff: 30,
            }
        );
        assert!(driver.is_override);
        assert!(driver.last_rc_update.is_some());
    }

    #[test]
    fn automatic_delta_clears_override_marker() {
        let mut driver = Driver::new("Rachid".to_string(), None);
        let bottle_type_id = Uuid::new_v4();
        driver.override_possession(BTreeMap::from([(bottle_type_id, 5)]), Utc::now());
        assert!(driver.is_override);

        let (change, _) = driver.apply_delta(bottle_type_id, -2);
        driver.push_rc_entry(Utc::now(), change.into_iter().collect());
        assert!(!driver.is_override);
        assert_eq!(driver.rc_history.len(), 2);
    }

    #[test]
    fn history_sorts_descending() {
        let mut driver = Driver::new("Rachid".to_string(), None);
        let old = Utc::now() - chrono::Duration::days(2);
        let new = Utc::now();
        driver.rc_history.push(RcHistoryEntry {
            date: old,
            changes: Vec::new(),
        });
        driver.rc_history.push(RcHistoryEntry {
            date: new,
            changes: Vec::new(),
        });

        let sorted = driver.rc_history_desc();
        assert_eq!(sorted[0].date, new);
        assert_eq!(sorted[1].date, old);
    }
}
