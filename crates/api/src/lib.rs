//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for leave accounts and requests
//! - JWT authentication middleware
//! - The JSON error envelope

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use hrm_core::leave::{LeaveCoordinator, LeaveQueryService};
use hrm_shared::JwtService;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The only writer of balances and request status.
    pub coordinator: Arc<LeaveCoordinator>,
    /// Read-side projections for list and summary views.
    pub queries: Arc<LeaveQueryService>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
