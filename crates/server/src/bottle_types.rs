//! Bottle-type catalog endpoints.

use api_types::bottle_type::{BottleTypeCreated, BottleTypeNew, BottleTypeUpdate, BottleTypeView};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use engine::{BottleType, BottleTypePatch, MoneyCents};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_bottle_type(bottle_type: &BottleType) -> BottleTypeView {
    BottleTypeView {
        id: bottle_type.id,
        name: bottle_type.name.clone(),
        capacity: bottle_type.capacity.clone(),
        unit_price_cents: bottle_type.unit_price.cents(),
        total_quantity: bottle_type.total_quantity,
        distributed_quantity: bottle_type.distributed_quantity,
        remaining_quantity: bottle_type.remaining_quantity,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<BottleTypeNew>,
) -> Result<Json<BottleTypeCreated>, ServerError> {
    if payload.unit_price_cents < 0 {
        return Err(ServerError::Generic(
            "unit price must not be negative".to_string(),
        ));
    }

    let mut engine = state.engine.write().await;
    let id = engine.create_bottle_type(
        &payload.name,
        &payload.capacity,
        MoneyCents::new(payload.unit_price_cents),
        payload.total_quantity,
    )?;
    Ok(Json(BottleTypeCreated { id }))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BottleTypeUpdate>,
) -> Result<Json<BottleTypeView>, ServerError> {
    if payload.unit_price_cents.is_some_and(|price| price < 0) {
        return Err(ServerError::Generic(
            "unit price must not be negative".to_string(),
        ));
    }

    let mut engine = state.engine.write().await;
    engine.update_bottle_type(
        id,
        BottleTypePatch {
            name: payload.name,
            capacity: payload.capacity,
            unit_price: payload.unit_price_cents.map(MoneyCents::new),
            total_quantity: payload.total_quantity,
        },
    )?;
    Ok(Json(map_bottle_type(engine.bottle_type(id)?)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BottleTypeView>, ServerError> {
    let mut engine = state.engine.write().await;
    let removed = engine.delete_bottle_type(id)?;
    Ok(Json(map_bottle_type(&removed)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<BottleTypeView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.bottle_types().iter().map(map_bottle_type).collect()))
}
