//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    diagnostics::{get_root, get_store_report},
    endpoints,
    expense::{create_expense_endpoint, get_summary_endpoint, list_expenses_endpoint},
};

/// Return a router with all the app's routes.
///
/// Requests from any origin are allowed.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(endpoints::STORE_REPORT, get(get_store_report))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response()
}
