use axum::{
    routing::{get, post, put},
    Router,
};

use crate::guard::require_permission;

pub mod auth;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod users;

/// Routes reachable without any credentials.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/forgotpassword", post(auth::forgot_password))
}

/// Routes behind the session middleware; per-route permission guards live in
/// the area routers.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/updatepassword", put(auth::update_password))
        .route(
            "/auth/register",
            post(auth::register)
                .layer(axum::middleware::from_fn(require_permission("create_user"))),
        )
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/permissions", permissions::router())
}
