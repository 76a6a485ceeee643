//! Live feed viewer
//!
//! Connects to the configured city feed and logs status transitions and
//! periodic state summaries until Ctrl-C.

use std::time::Duration;

use corridor_client::{ClientConfig, SyncClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corridor=info,corridor_live=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(url = %config.url, "starting corridor client");

    let mut client = SyncClient::new(config);
    client.connect();

    let store = client.store();
    let mut status = client.subscribe_status();
    let mut summary = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let update = status.borrow().clone();
                tracing::info!(
                    status = %update.status,
                    error = update.error.as_deref(),
                    "status change"
                );
            }

            _ = summary.tick() => {
                let store = store.read().await;
                tracing::info!(
                    city = store.city_id().unwrap_or("-"),
                    nodes = store.nodes().len(),
                    incidents = store.incidents().len(),
                    routes = store.routes().len(),
                    selected = store.selected_node().unwrap_or("-"),
                    "city state"
                );
            }
        }
    }

    tracing::info!("shutting down");
    client.disconnect().await;

    Ok(())
}
