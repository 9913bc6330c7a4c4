//! Return order (B.D) endpoints.

use api_types::returns::{ReturnItemView, ReturnOrderCreated, ReturnOrderNew, ReturnOrderView};
use axum::{Json, extract::State};
use chrono::Utc;

use engine::{ReturnItemInput, ReturnOrder, ReturnOrderCmd};

use crate::{ServerError, map_warnings, server::ServerState};

pub(crate) fn map_return_order(order: &ReturnOrder) -> ReturnOrderView {
    ReturnOrderView {
        id: order.id,
        date: order.date,
        driver_id: order.driver_id,
        supply_order_id: order.supply_order_id,
        items: order
            .items
            .iter()
            .map(|item| ReturnItemView {
                bottle_type_id: item.bottle_type_id,
                returned_empty_quantity: item.returned_empty_quantity,
                returned_full_quantity: item.returned_full_quantity,
                consigne_quantity: item.consigne_quantity,
                lost_quantity: item.lost_quantity,
                foreign_quantity: item.foreign_quantity,
                defective_quantity: item.defective_quantity,
                foreign_company: item.foreign_company.clone(),
            })
            .collect(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReturnOrderNew>,
) -> Result<Json<ReturnOrderCreated>, ServerError> {
    let mut cmd = ReturnOrderCmd::new(payload.driver_id, payload.date.unwrap_or_else(Utc::now));
    if let Some(supply_order_id) = payload.supply_order_id {
        cmd = cmd.supply_order(supply_order_id);
    }
    for item in payload.items {
        cmd = cmd.item(ReturnItemInput {
            bottle_type_id: item.bottle_type_id,
            returned_empty_quantity: item.returned_empty_quantity,
            returned_full_quantity: item.returned_full_quantity,
            consigne_quantity: item.consigne_quantity,
            lost_quantity: item.lost_quantity,
            foreign_quantity: item.foreign_quantity,
            defective_quantity: item.defective_quantity,
            foreign_company: item.foreign_company,
        });
    }

    let mut engine = state.engine.write().await;
    let outcome = engine.create_return_order(cmd)?;
    Ok(Json(ReturnOrderCreated {
        order: map_return_order(&outcome.order),
        warnings: map_warnings(&outcome.warnings),
        skipped: outcome.skipped,
    }))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ReturnOrderView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(
        engine.return_orders().iter().map(map_return_order).collect(),
    ))
}
