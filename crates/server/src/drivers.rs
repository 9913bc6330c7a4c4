//! Driver registry and R.C possession endpoints.

use api_types::driver::{
    DriverCreated, DriverNew, DriverView, PossessionOverride, RcChangeView, RcHistoryView,
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use engine::{Driver, RcHistoryEntry};

use crate::{ServerError, server::ServerState};

fn map_driver(driver: &Driver) -> DriverView {
    DriverView {
        id: driver.id,
        name: driver.name.clone(),
        truck: driver.truck.clone(),
        remaining_bottles: driver.remaining_bottles.clone(),
        is_override: driver.is_override,
        last_rc_update: driver.last_rc_update,
    }
}

fn map_rc_entry(entry: &RcHistoryEntry) -> RcHistoryView {
    RcHistoryView {
        date: entry.date,
        changes: entry
            .changes
            .iter()
            .map(|change| RcChangeView {
                bottle_type_id: change.bottle_type_id,
                previous_qty: change.previous_qty,
                new_qty: change.new_qty,
                diff: change.diff,
            })
            .collect(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DriverNew>,
) -> Result<Json<DriverCreated>, ServerError> {
    let mut engine = state.engine.write().await;
    let id = engine.create_driver(&payload.name, payload.truck.as_deref())?;
    Ok(Json(DriverCreated { id }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverView>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(map_driver(engine.driver(id)?)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverView>, ServerError> {
    let mut engine = state.engine.write().await;
    let removed = engine.delete_driver(id)?;
    Ok(Json(map_driver(&removed)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<DriverView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.drivers().iter().map(map_driver).collect()))
}

pub async fn override_possession(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PossessionOverride>,
) -> Result<Json<RcHistoryView>, ServerError> {
    let mut engine = state.engine.write().await;
    let entry = engine.override_driver_possession(id, payload.possession)?;
    Ok(Json(map_rc_entry(&entry)))
}

pub async fn rc_history(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RcHistoryView>>, ServerError> {
    let engine = state.engine.read().await;
    let history = engine.rc_history(id)?;
    Ok(Json(history.iter().map(map_rc_entry).collect()))
}
