//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: infrastructure wiring (stores, catalog/registry, gate,
//!   resolver) plus catalog bootstrap
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use millworks_infra::AuthConfig;

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(config: AuthConfig, admin_email: &str, admin_password: &str) -> Router {
    let services = Arc::new(
        services::build_services(config, admin_email, admin_password).await,
    );
    let auth_state = AuthState {
        services: services.clone(),
    };

    // Protected routes: valid session required; per-route permission guards
    // are layered inside the area routers.
    let protected = routes::protected_router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::protect,
        ));

    // Routes that adapt to an anonymous caller instead of rejecting it.
    let ambient = Router::new()
        .route("/whoami", get(routes::system::whoami))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::optional,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(ambient)
        .merge(protected)
        .layer(Extension(services))
}
