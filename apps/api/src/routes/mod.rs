pub mod health;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::entries::handlers;
use crate::errors::AppError;
use crate::state::AppState;

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

/// Builds the router. Unknown paths and unregistered methods on known paths
/// both answer with the route-not-found body.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(health::health_handler).fallback(route_not_found),
        )
        .route(
            "/entries",
            get(handlers::handle_list)
                .post(handlers::handle_create)
                .fallback(route_not_found),
        )
        .route(
            "/entries/owner/:owner_id",
            get(handlers::handle_list_by_owner).fallback(route_not_found),
        )
        .route(
            "/entries/zip/:postal_code",
            get(handlers::handle_list_by_postal_code).fallback(route_not_found),
        )
        .route(
            "/entries/:id",
            get(handlers::handle_get)
                .put(handlers::handle_replace)
                .delete(handlers::handle_delete)
                .fallback(route_not_found),
        )
        .route(
            "/entries/:id/text",
            put(handlers::handle_patch_text).fallback(route_not_found),
        )
        .route(
            "/entries/:id/zip",
            put(handlers::handle_patch_postal_code).fallback(route_not_found),
        )
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
