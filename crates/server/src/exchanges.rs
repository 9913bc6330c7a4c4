//! Brand-to-brand exchange endpoints.

use api_types::exchange::{ExchangeNew, ExchangeView};
use axum::{Json, extract::State};
use chrono::Utc;

use engine::{ExchangeCmd, ExchangeRecord, MoneyCents};

use crate::{ServerError, server::ServerState};

fn map_exchange(record: &ExchangeRecord) -> ExchangeView {
    ExchangeView {
        id: record.id,
        date: record.date,
        company_name: record.company_name.clone(),
        client_name: record.client_name.clone(),
        bottle_type_id: record.bottle_type_id,
        quantity_given: record.quantity_given,
        quantity_received: record.quantity_received,
        price_difference_cents: record.price_difference.cents(),
        is_paid_by_us: record.is_paid_by_us,
        paid_by: record.paid_by.clone(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExchangeNew>,
) -> Result<Json<ExchangeView>, ServerError> {
    if payload.unit_price_cents.is_some_and(|price| price < 0) {
        return Err(ServerError::Generic(
            "unit price must not be negative".to_string(),
        ));
    }

    let mut cmd = ExchangeCmd::new(
        payload.company_name,
        payload.bottle_type_id,
        payload.quantity_given,
        payload.quantity_received,
        payload.date.unwrap_or_else(Utc::now),
    );
    if let Some(client_name) = payload.client_name {
        cmd = cmd.client_name(client_name);
    }
    if let Some(price) = payload.unit_price_cents {
        cmd = cmd.unit_price(MoneyCents::new(price));
    }
    if let Some(paid_by) = payload.paid_by {
        cmd = cmd.paid_by(paid_by);
    }

    let mut engine = state.engine.write().await;
    let record = engine.create_exchange(cmd)?;
    Ok(Json(map_exchange(&record)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExchangeView>>, ServerError> {
    let engine = state.engine.read().await;
    Ok(Json(engine.exchanges().iter().map(map_exchange).collect()))
}
