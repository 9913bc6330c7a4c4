//! Supply order (B.S) endpoints.

use api_types::supply::{SupplyItemView, SupplyOrderCreated, SupplyOrderNew, SupplyOrderView};
use axum::{Json, extract::State};
use chrono::Utc;

use engine::{MoneyCents, SupplyOrder, SupplyOrderCmd};

use crate::{ServerError, map_warnings, server::ServerState};

pub(crate) fn map_supply_order(order: &SupplyOrder) -> SupplyOrderView {
    SupplyOrderView {
        id: order.id,
        order_number: order.order_number.clone(),
        date: order.date,
        driver_id: order.driver_id,
        client_id: order.client_id.clone(),
        items: order
            .items
            .iter()
            .map(|item| SupplyItemView {
                bottle_type_id: item.bottle_type_id,
                empty_quantity: item.empty_quantity,
                full_quantity: item.full_quantity,
                unit_price_cents: item.unit_price.cents(),
                amount_cents: item.amount.cents(),
            })
            .collect(),
        subtotal_cents: order.subtotal.cents(),
        tax_cents: order.tax.cents(),
        total_cents: order.total.cents(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SupplyOrderNew>,
) -> Result<Json<SupplyOrderCreated>, ServerError> {
    if payload
        .items
        .iter()
        .any(|item| item.unit_price_cents.is_some_and(|price| price < 0))
    {
        return Err(ServerError::Generic(
            "unit price must not be negative".to_string(),
        ));
    }

    let mut cmd = SupplyOrderCmd::new(
        payload.order_number,
        payload.driver_id,
        payload.date.unwrap_or_else(Utc::now),
    );
    if let Some(client_id) = payload.client_id {
        cmd = cmd.client_id(client_id);
    }
    for item in payload.items {
        cmd = match item.unit_price_cents {
            Some(price) => cmd.item_priced(
                item.bottle_type_id,
                item.empty_quantity,
                item.full_quantity,
                MoneyCents::new(price),
            ),
            None => cmd.item(item.bottle_type_id, item.empty_quantity, item.full_quantity),
        };
    }

    let mut engine = state.engine.write().await;
    let outcome = engine.create_supply_order(cmd)?;
    Ok(Json(SupplyOrderCreated {
        order: map_supply_order(&outcome.order),
        warnings: map_warnings(&outcome.warnings),
    }))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<SupplyOrderView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(
        engine.supply_orders().iter().map(map_supply_order).collect(),
    ))
}
