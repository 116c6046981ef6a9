//! Authentication endpoints: login, logout, identity, password management,
//! administrative registration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use millworks_auth::{password, AuthError, Session, User};

use crate::app::{dto, errors, services::AppServices};

/// Build the HTTP-only session cookie. The header transport still wins when
/// both are presented.
fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("token={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}")
}

fn clear_session_cookie() -> String {
    session_cookie("", 0)
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "email and password are required",
        );
    }

    match services.gate.login(&body.email, &body.password).await {
        Ok(outcome) => {
            let cookie = session_cookie(&outcome.token, services.tokens.ttl().num_seconds());
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(serde_json::json!({
                    "success": true,
                    "token": outcome.token,
                    "user": outcome.user,
                })),
            )
                .into_response()
        }
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// POST /auth/logout. Tokens are stateless, so this only clears the cookie
/// transport; the bearer token stays valid until expiry.
pub async fn logout(Extension(session): Extension<Session>) -> axum::response::Response {
    tracing::info!(user_id = %session.user.id, "user logged out");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

/// GET /auth/me
pub async fn me(Extension(session): Extension<Session>) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "data": session.user,
        })),
    )
        .into_response()
}

/// PUT /auth/updatepassword
pub async fn update_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Json(body): Json<dto::UpdatePasswordRequest>,
) -> axum::response::Response {
    if body.current_password.is_empty() || body.new_password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "currentPassword and newPassword are required",
        );
    }

    match services
        .gate
        .change_password(session.user.id, &body.current_password, &body.new_password)
        .await
    {
        Ok(token) => {
            let cookie = session_cookie(&token, services.tokens.ttl().num_seconds());
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(serde_json::json!({ "success": true, "token": token })),
            )
                .into_response()
        }
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// POST /auth/forgotpassword. Acknowledged but intentionally inert: no reset
/// token is issued and no email is sent.
pub async fn forgot_password(
    Json(body): Json<dto::ForgotPasswordRequest>,
) -> axum::response::Response {
    tracing::info!(email = %body.email, "password reset requested");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

/// POST /auth/register. Administrative user creation, guarded by the
/// `create_user` permission; there is no self-registration.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match create_user(&services, &session, body).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "data": user })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

async fn create_user(
    services: &AppServices,
    actor: &Session,
    body: dto::RegisterRequest,
) -> Result<User, AuthError> {
    if body.password.len() < services.config.min_password_len {
        return Err(AuthError::validation(format!(
            "password must be at least {} characters",
            services.config.min_password_len
        )));
    }

    if services.users.find_by_email(&body.email).await?.is_some() {
        return Err(AuthError::DuplicateKey { field: "email" });
    }
    if let Some(employee_id) = &body.employee_id {
        if services
            .users
            .find_by_employee_id(employee_id)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateKey {
                field: "employee_id",
            });
        }
    }

    // The role reference must resolve before it is persisted.
    let role = services.registry.get(body.role).await?;

    let hash = password::hash_password(&body.password)
        .map_err(|e| AuthError::store(format!("password hashing failed: {e}")))?;

    let mut user = User::new(
        body.email,
        body.display_name,
        hash,
        role.id,
        chrono::Utc::now(),
    )?;
    if let Some(employee_id) = body.employee_id {
        user = user.with_employee_id(employee_id);
    }

    let created = services.users.insert(user).await?;
    tracing::info!(
        actor = %actor.user.id,
        user_id = %created.id,
        email = %created.email,
        role = %role.name,
        "user registered"
    );
    Ok(created)
}
