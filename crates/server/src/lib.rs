use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{ConsistencyWarning, EngineError};

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod bottle_types;
mod drivers;
mod exchanges;
mod foreign;
mod impact;
mod returns;
mod server;
mod snapshot;
mod stock;
mod supply;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidQuantity(_) | EngineError::InvalidOrder(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Storage(storage_err) => {
            tracing::error!("storage error: {storage_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

pub(crate) fn map_warning(warning: &ConsistencyWarning) -> api_types::Warning {
    match warning {
        ConsistencyWarning::NegativeClamped {
            stock,
            bottle_type_id,
            previous,
            requested,
        } => api_types::Warning::NegativeClamped {
            stock: stock.as_str().to_string(),
            bottle_type_id: *bottle_type_id,
            previous: *previous,
            requested: *requested,
        },
        ConsistencyWarning::PossessionClamped {
            driver_id,
            bottle_type_id,
            previous,
            requested,
        } => api_types::Warning::PossessionClamped {
            driver_id: *driver_id,
            bottle_type_id: *bottle_type_id,
            previous: *previous,
            requested: *requested,
        },
        ConsistencyWarning::OverAccounted {
            bottle_type_id,
            supplied,
            accounted,
        } => api_types::Warning::OverAccounted {
            bottle_type_id: *bottle_type_id,
            supplied: *supplied,
            accounted: *accounted,
        },
        ConsistencyWarning::DistributionShortfall {
            bottle_type_id,
            deficit,
        } => api_types::Warning::DistributionShortfall {
            bottle_type_id: *bottle_type_id,
            deficit: *deficit,
        },
    }
}

pub(crate) fn map_warnings(warnings: &[ConsistencyWarning]) -> Vec<api_types::Warning> {
    warnings.iter().map(map_warning).collect()
}
