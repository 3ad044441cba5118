use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, borrow_loan, get_loan_by_id, return_loan};

/// Creates the API router with the loan lifecycle endpoints
///
/// Command endpoints (Write operations):
/// - POST /loans/borrow - Borrow a book
/// - PUT /loans/:id/return - Return a loan
///
/// Query endpoints (Read operations):
/// - GET /loans/:id - Get loan details
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/loans/borrow", post(borrow_loan))
        .route("/loans/:id/return", put(return_loan))
        // Query endpoints (Read operations)
        .route("/loans/:id", get(get_loan_by_id))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
