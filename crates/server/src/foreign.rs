//! Foreign-bottle ledger endpoints.

use api_types::foreign::{
    CompanyTotal, ForeignCreated, ForeignEntryView, ForeignNew, ForeignTotals, PairTotal,
    TypeTotal,
};
use axum::{Json, extract::State};

use engine::{ForeignBottleEntry, ForeignEntryKind};

use crate::{ServerError, server::ServerState};

fn map_entry(entry: &ForeignBottleEntry) -> ForeignEntryView {
    ForeignEntryView {
        id: entry.id,
        company_name: entry.company_name.clone(),
        bottle_type_id: entry.bottle_type_id,
        quantity: entry.quantity,
        kind: match entry.kind {
            ForeignEntryKind::Normal => "normal".to_string(),
            ForeignEntryKind::Return => "return".to_string(),
        },
        return_order_id: entry.return_order_id,
        date: entry.date,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ForeignNew>,
) -> Result<Json<ForeignCreated>, ServerError> {
    let mut engine = state.engine.write().await;
    let id = engine.add_foreign_bottles(
        &payload.company_name,
        payload.bottle_type_id,
        payload.quantity,
    )?;
    Ok(Json(ForeignCreated { id }))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ForeignEntryView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.foreign_bottles().iter().map(map_entry).collect()))
}

pub async fn totals(State(state): State<ServerState>) -> Result<Json<ForeignTotals>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(ForeignTotals {
        by_company: engine
            .foreign_totals_by_company()
            .into_iter()
            .map(|(company_name, quantity)| CompanyTotal {
                company_name,
                quantity,
            })
            .collect(),
        by_type: engine
            .foreign_totals_by_type()
            .into_iter()
            .map(|(bottle_type_id, quantity)| TypeTotal {
                bottle_type_id,
                quantity,
            })
            .collect(),
        by_company_and_type: engine
            .foreign_totals_by_company_and_type()
            .into_iter()
            .map(|row| PairTotal {
                company_name: row.company_name,
                bottle_type_id: row.bottle_type_id,
                quantity: row.quantity,
            })
            .collect(),
    }))
}
