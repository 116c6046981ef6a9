use millworks_infra::AuthConfig;

#[tokio::main]
async fn main() {
    millworks_observability::init();

    let config = AuthConfig::from_env();

    let admin_email = std::env::var("MILLWORKS_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@millworks.local".to_string());
    let admin_password = std::env::var("MILLWORKS_ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("MILLWORKS_ADMIN_PASSWORD not set; using insecure dev default");
        "change-me-immediately".to_string()
    });

    let app = millworks_api::app::build_app(config, &admin_email, &admin_password).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
