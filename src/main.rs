use finance_sync::app::build_router;
use finance_sync::config::{Settings, StoreBackend, USAGE};
use finance_sync::media::blob::BlobStore;
use finance_sync::media::cloudinary::CloudinaryClient;
use finance_sync::storage::document::MongoStore;
use finance_sync::storage::memory::MemoryStore;
use finance_sync::storage::store::RecordStore;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(settings.log_level)
        .init();

    // 1. Storage:
    let store: Arc<dyn RecordStore> = match settings.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store (state is lost on restart)");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Mongo => {
            let Some(mongo) = settings.mongo.as_ref() else {
                eprintln!("{}", USAGE);
                std::process::exit(1);
            };
            match MongoStore::connect(mongo).await {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("MongoDB connection failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    // 2. Media provider:
    let blobs = settings.media.clone().map(|media| {
        tracing::info!("Media uploads go to cloud '{}'", media.cloud_name);
        Arc::new(CloudinaryClient::new(media)) as Arc<dyn BlobStore>
    });

    // 3. HTTP Router:
    let app = build_router(store, blobs);

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", settings.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
