//! Snapshot export/import and inventory reset.
//!
//! The snapshot *is* the wire format: export returns the full state, import
//! replaces it wholesale.

use axum::{Json, extract::State};

use engine::Snapshot;

use crate::{ServerError, server::ServerState};

pub async fn export(State(state): State<ServerState>) -> Result<Json<Snapshot>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.export_snapshot()))
}

pub async fn import(
    State(state): State<ServerState>,
    Json(payload): Json<Snapshot>,
) -> Result<Json<Snapshot>, ServerError> {
    let mut engine = state.engine.write().await;
    engine.import_snapshot(payload)?;
    Ok(Json(engine.export_snapshot()))
}

pub async fn clear_inventory(State(state): State<ServerState>) -> Result<Json<Snapshot>, ServerError> {
    let mut engine = state.engine.write().await;
    engine.clear_all_inventory()?;
    Ok(Json(engine.export_snapshot()))
}
