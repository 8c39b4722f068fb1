// Certificate Server - binary entry point

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, Method};
use certificate_server::artifacts::{ArtifactStore, LocalArtifactStore, MirroredArtifactStore};
use certificate_server::convert::ChromiumConverter;
use certificate_server::routes::with_artifact_files;
use certificate_server::store::{MemoryRecordStore, PgRecordStore, RecordStore};
use certificate_server::{create_router, db, CertificateService, Config};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "certificate_server=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;

    let records: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Using PostgreSQL record store");
            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let local = LocalArtifactStore::new(&config.artifact_dir).with_context(|| {
        format!(
            "Failed to open artifact directory {}",
            config.artifact_dir.display()
        )
    })?;
    let artifacts: Arc<dyn ArtifactStore> = match &config.artifact_mirror_dir {
        Some(mirror_dir) => {
            let mirror = LocalArtifactStore::new(mirror_dir).with_context(|| {
                format!("Failed to open mirror directory {}", mirror_dir.display())
            })?;
            tracing::info!(mirror_dir = %mirror_dir.display(), "Mirroring certificate artifacts");
            Arc::new(MirroredArtifactStore::new(Arc::new(local), mirror))
        }
        None => Arc::new(local),
    };

    let converter = ChromiumConverter::new(&config.chromium_path).with_timeout(config.render_timeout);

    let service = CertificateService::new(
        records,
        artifacts,
        Arc::new(converter),
        config.artifact_base_url.clone(),
    )?
    .with_existing_fields_policy(config.existing_fields_policy);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = with_artifact_files(create_router(service), &config.artifact_dir)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        artifact_base_url = %config.artifact_base_url,
        "Certificate server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
