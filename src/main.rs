use hoverboard::{config, db, routes, services, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration invalid");
            std::process::exit(1);
        }
    };

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("database init failed");

    if config.seed_sample_data {
        if let Err(e) = services::seed::seed_sample_data(&pool).await {
            tracing::warn!(error = %e, "sample data seeding failed");
        }
    }

    let port = config.port;
    let state = state::AppState::new(pool, config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "hoverboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
