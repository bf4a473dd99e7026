use std::sync::Arc;

use allerta_api::{config::AllertaApiConfig, context::ApiContext, server};
use allerta_db::storage::mongodb::MongoDBStorage;
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AllertaApiConfig::parse();

    if !config.dump_openapi {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or("allerta_api=info,allerta_db=info,tower_http=info".into()),
            )
            .pretty()
            .init();
    }

    let storage = MongoDBStorage::new(&config.mongodb_uri)
        .await
        .context("Failed to connect to MongoDB")?;
    if !config.dump_openapi {
        storage
            .ensure_indexes()
            .await
            .context("Failed to create indexes")?;
    }

    let ctx = ApiContext::new(config.clone(), Arc::new(storage))?;
    let (router, api) = server::make(ctx)?;

    if config.dump_openapi {
        print!("{}", api.to_pretty_json()?);
        return Ok(());
    }

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, router)
        .await
        .context("Server exited with an error")
}
