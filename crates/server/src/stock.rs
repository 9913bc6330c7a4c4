//! Empty/defective pool endpoints and the stock audit trail.

use api_types::stock::{StockAdjust, StockAdjusted, StockEntryView, StockHistoryView};
use axum::{Json, extract::State};

use engine::{StockEntry, StockHistoryEntry, StockUpdate};

use crate::{ServerError, map_warnings, server::ServerState};

fn map_entry(entry: &StockEntry) -> StockEntryView {
    StockEntryView {
        bottle_type_id: entry.bottle_type_id,
        quantity: entry.quantity,
        last_updated: entry.last_updated,
    }
}

fn map_update(update: &StockUpdate) -> StockAdjusted {
    StockAdjusted {
        bottle_type_id: update.bottle_type_id,
        quantity: update.quantity,
        warnings: map_warnings(&update.warnings),
    }
}

fn map_history(entry: &StockHistoryEntry) -> StockHistoryView {
    StockHistoryView {
        id: entry.id,
        date: entry.date,
        bottle_type_id: entry.bottle_type_id,
        stock: entry.stock.as_str().to_string(),
        change: entry.change.as_str().to_string(),
        quantity: entry.quantity,
        previous_quantity: entry.previous_quantity,
        new_quantity: entry.new_quantity,
        note: entry.note.clone(),
    }
}

pub async fn add_empty(
    State(state): State<ServerState>,
    Json(payload): Json<StockAdjust>,
) -> Result<Json<StockAdjusted>, ServerError> {
    let mut engine = state.engine.write().await;
    let update =
        engine.add_empty_stock(payload.bottle_type_id, payload.quantity, payload.note.as_deref())?;
    Ok(Json(map_update(&update)))
}

pub async fn remove_empty(
    State(state): State<ServerState>,
    Json(payload): Json<StockAdjust>,
) -> Result<Json<StockAdjusted>, ServerError> {
    let mut engine = state.engine.write().await;
    let update = engine.remove_empty_stock(
        payload.bottle_type_id,
        payload.quantity,
        payload.note.as_deref(),
    )?;
    Ok(Json(map_update(&update)))
}

pub async fn add_defective(
    State(state): State<ServerState>,
    Json(payload): Json<StockAdjust>,
) -> Result<Json<StockAdjusted>, ServerError> {
    let mut engine = state.engine.write().await;
    let update = engine.add_defective_stock(
        payload.bottle_type_id,
        payload.quantity,
        payload.note.as_deref(),
    )?;
    Ok(Json(map_update(&update)))
}

pub async fn remove_defective(
    State(state): State<ServerState>,
    Json(payload): Json<StockAdjust>,
) -> Result<Json<StockAdjusted>, ServerError> {
    let mut engine = state.engine.write().await;
    let update = engine.remove_defective_stock(
        payload.bottle_type_id,
        payload.quantity,
        payload.note.as_deref(),
    )?;
    Ok(Json(map_update(&update)))
}

pub async fn list_empty(
    State(state): State<ServerState>,
) -> Result<Json<Vec<StockEntryView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.empty_stock().iter().map(map_entry).collect()))
}

pub async fn list_defective(
    State(state): State<ServerState>,
) -> Result<Json<Vec<StockEntryView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.defective_stock().iter().map(map_entry).collect()))
}

pub async fn history(
    State(state): State<ServerState>,
) -> Result<Json<Vec<StockHistoryView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.stock_history().iter().map(map_history).collect()))
}
