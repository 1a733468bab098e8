//! Croplink marketplace HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the token verifier, and the HTTP router,
//! then starts the API server.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup
//! logic.
mod api;
mod app;
mod auth;
mod config;
mod model;
mod observability;
mod store;

use anyhow::Context;
use app::{build_router, AppState};
use auth::firebase::FirebaseTokenVerifier;
use auth::verifier::{StaticTokenVerifier, TokenVerifier};
use std::future::Future;
use std::sync::Arc;
use store::{memory::InMemoryStore, mongo::MongoStore, CropStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::ServiceConfig::from_env_or_yaml().context("service config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::ServiceConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    observability::init_observability();
    let state = build_state(config.clone()).await?;
    tracing::info!(backend = state.store.backend_name(), "store ready");

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "croplink server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }
    Ok(())
}

async fn build_state(config: config::ServiceConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn CropStore> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Mongodb => {
            let mongo = config
                .mongo
                .as_ref()
                .context("mongodb configuration missing")?;
            Arc::new(MongoStore::connect(mongo).await?)
        }
    };

    let verifier: Arc<dyn TokenVerifier> = match config.auth {
        config::AuthBackend::Firebase => {
            let project = config
                .firebase_project
                .as_deref()
                .context("firebase project missing")?;
            Arc::new(FirebaseTokenVerifier::new(project))
        }
        config::AuthBackend::Static => {
            let token = config
                .static_token
                .as_deref()
                .context("static token missing")?;
            Arc::new(StaticTokenVerifier::new(token))
        }
    };

    Ok(AppState { store, verifier })
}
