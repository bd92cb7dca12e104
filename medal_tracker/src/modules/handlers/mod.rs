pub mod league;
pub mod medal;

use crate::modules::medals::store::MedalStore;
use axum::{extract::Extension, http::StatusCode};
use std::sync::Arc;

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Ready once the medal store answers.
pub async fn readiness(Extension(store): Extension<Arc<dyn MedalStore>>) -> StatusCode {
    match store.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("medal store is not reachable: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
