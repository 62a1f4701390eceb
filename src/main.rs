use std::sync::Arc;

use theater::{
    AppState,
    config::Settings,
    db::{Backend, Db},
    routes,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,theater=debug,sqlx=warn".to_string()),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        environment = ?settings.environment,
        seed_csv = %settings.seed_csv_path.display(),
        "settings resolved"
    );

    let backend = Backend::select(&settings)?;
    let db = Db::connect(&backend).await?;

    let app = routes::router(Arc::new(AppState { db }));

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    tracing::info!(addr = %settings.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
