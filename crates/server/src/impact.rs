//! Stock-impact reporting endpoint.

use api_types::impact::{ImpactQuery, ImpactView, Window};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

use engine::ImpactWindow;

use crate::{ServerError, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Query(query): Query<ImpactQuery>,
) -> Result<Json<ImpactView>, ServerError> {
    let window = match query.window {
        Window::Today => ImpactWindow::Today,
        Window::Last7days => ImpactWindow::Last7Days,
    };

    let engine = state.engine.read().await;
    let totals = engine.impact(window, Utc::now());
    Ok(Json(ImpactView {
        window: query.window,
        empty_delta: totals.empty_delta,
        full_delta: totals.full_delta,
        defective_delta: totals.defective_delta,
        foreign_delta: totals.foreign_delta,
    }))
}
