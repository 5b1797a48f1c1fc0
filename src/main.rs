use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lostfound::{
    api,
    config::Settings,
    repository::CsvAnnouncementRepository,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lostfound=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Lost & Found board on {}:{}",
        settings.server.host,
        settings.server.port
    );

    tokio::fs::create_dir_all(&settings.storage.images_dir).await?;
    tracing::info!(
        "Announcements stored in {}, images in {}",
        settings.storage.data_file,
        settings.storage.images_dir
    );

    // Initialize storage and services
    let announcement_repo = Arc::new(CsvAnnouncementRepository::new(&settings.storage.data_file));
    let service_context = Arc::new(ServiceContext::new(
        announcement_repo,
        &settings.storage.images_dir,
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on {}", settings.server.base_url);

    axum::serve(listener, app).await?;

    Ok(())
}
