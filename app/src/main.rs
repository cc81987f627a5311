//! Boxoffice binary: wires the store to the hosted gateway and loads the
//! initial snapshot.

use anyhow::Result;
use boxoffice::app::{AppAction, AppReducer, AppState, AppStore};
use boxoffice::config::Config;
use boxoffice::environment::AppEnvironment;
use boxoffice::gateway::RestGateway;
use boxoffice::slices::{AuthAction, EventsAction};
use boxoffice_gateway::RestClient;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::info!(url = %config.gateway.url, "Starting boxoffice");

    let rest = RestClient::new(
        config.gateway.url.clone(),
        config.gateway.anon_key.clone(),
    );
    let environment = AppEnvironment::new(Arc::new(RestGateway::new(rest)));
    let store = AppStore::new(AppState::default(), AppReducer::new(), environment);

    // Restore any held session and load the catalog
    let mut session = store.send(AppAction::Auth(AuthAction::LoadSession)).await?;
    let mut catalog = store
        .send(AppAction::Events(EventsAction::FetchEvents))
        .await?;
    session.wait().await;
    catalog.wait().await;

    let (signed_in, event_count, error) = store
        .state(|s| {
            (
                s.auth.is_authenticated,
                s.events.events.len(),
                s.events.error.clone(),
            )
        })
        .await;

    if let Some(error) = error {
        tracing::error!(%error, "Catalog load failed");
    } else {
        tracing::info!(signed_in, event_count, "Initial snapshot loaded");
    }

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
