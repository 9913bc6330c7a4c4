//! Read-side stock-impact aggregation.
//!
//! Derives time-windowed deltas across all ledgers from the recorded orders
//! and direct foreign entries, using the same formulas the processors apply.
//! Never mutates anything; integrated from the beginning of history it must
//! agree with the ledgers' current totals.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Engine, EngineError, foreign::ForeignEntryKind};

/// Reporting window, anchored on calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactWindow {
    /// From today's midnight (UTC).
    Today,
    /// Rolling 7-day window including today.
    Last7Days,
}

impl ImpactWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Last7Days => "last7days",
        }
    }

    /// Inclusive lower bound of the window.
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let day = match self {
            Self::Today => today,
            Self::Last7Days => today - chrono::Days::new(6),
        };
        day.and_time(NaiveTime::MIN).and_utc()
    }
}

impl TryFrom<&str> for ImpactWindow {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "today" => Ok(Self::Today),
            "last7days" => Ok(Self::Last7Days),
            other => Err(EngineError::InvalidQuantity(format!(
                "invalid impact window: {other}"
            ))),
        }
    }
}

/// Summed per-ledger deltas over a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactTotals {
    pub empty_delta: i64,
    /// Change to depot full stock (supply dispatches down, full returns up).
    pub full_delta: i64,
    pub defective_delta: i64,
    pub foreign_delta: i64,
}

impl Engine {
    /// Deltas accumulated inside `window`, evaluated at `now`.
    pub fn impact(&self, window: ImpactWindow, now: DateTime<Utc>) -> ImpactTotals {
        self.impact_between(Some(window.start(now)), Some(now))
    }

    /// Deltas integrated from the beginning of history.
    pub fn impact_all_time(&self) -> ImpactTotals {
        self.impact_between(None, None)
    }

    fn impact_between(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> ImpactTotals {
        let in_window = |date: DateTime<Utc>| {
            start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
        };
        let mut totals = ImpactTotals::default();

        for order in &self.supply_orders {
            if !in_window(order.date) {
                continue;
            }
            for item in &order.items {
                totals.full_delta -= i64::from(item.full_quantity);
            }
        }

        for order in &self.return_orders {
            if !in_window(order.date) {
                continue;
            }
            for item in &order.items {
                totals.empty_delta += item.empty_delta();
                totals.full_delta += i64::from(item.returned_full_quantity);
                totals.defective_delta += i64::from(item.defective_quantity);
                totals.foreign_delta += i64::from(item.foreign_quantity);
            }
        }

        // Return-sourced foreign entries are already counted through their
        // return order above.
        for entry in self.foreign_bottles.entries() {
            if entry.kind == ForeignEntryKind::Normal && in_window(entry.date) {
                totals.foreign_delta += i64::from(entry.quantity);
            }
        }

        totals
    }
}
