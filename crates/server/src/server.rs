use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tokio::sync::RwLock;

use engine::Engine;

use crate::{
    bottle_types, drivers, exchanges, foreign, impact, returns, snapshot, stock, supply,
};

/// Shared handler state.
///
/// The engine itself is synchronous and single-writer; the `RwLock` is what
/// serializes concurrent HTTP requests onto it.
#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<RwLock<Engine>>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/bottleTypes", post(bottle_types::create).get(bottle_types::list))
        .route("/bottleTypes/{id}", patch(bottle_types::update).delete(bottle_types::delete))
        .route("/drivers", post(drivers::create).get(drivers::list))
        .route("/drivers/{id}", get(drivers::get).delete(drivers::delete))
        .route("/drivers/{id}/possession", post(drivers::override_possession))
        .route("/drivers/{id}/rcHistory", get(drivers::rc_history))
        .route("/supplyOrders", post(supply::create).get(supply::list))
        .route("/returnOrders", post(returns::create).get(returns::list))
        .route("/exchanges", post(exchanges::create).get(exchanges::list))
        .route("/stock/empty", get(stock::list_empty))
        .route("/stock/empty/add", post(stock::add_empty))
        .route("/stock/empty/remove", post(stock::remove_empty))
        .route("/stock/defective", get(stock::list_defective))
        .route("/stock/defective/add", post(stock::add_defective))
        .route("/stock/defective/remove", post(stock::remove_defective))
        .route("/stock/history", get(stock::history))
        .route("/foreignBottles", post(foreign::create).get(foreign::list))
        .route("/foreignBottles/totals", get(foreign::totals))
        .route("/impact", get(impact::get))
        .route("/snapshot", get(snapshot::export).put(snapshot::import))
        .route("/inventory/clear", post(snapshot::clear_inventory))
        .with_state(state)
}

/// Runs the server on `127.0.0.1:3000`.
pub async fn run(engine: Engine) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    run_with_listener(engine, listener).await
}

/// Runs the server on an already-bound listener.
pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let state = ServerState {
        engine: Arc::new(RwLock::new(engine)),
    };
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {addr}");
    }
    axum::serve(listener, router(state)).await
}

/// Spawns the server as a background task, returning its join handle.
pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> tokio::task::JoinHandle<Result<(), std::io::Error>> {
    tokio::spawn(run_with_listener(engine, listener))
}
