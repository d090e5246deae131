//! Application startup.
//!
//! Wires the persisted store, the auth and profile services, and the
//! controller together, then resolves the initial authentication state
//! exactly once.

use std::sync::Arc;

use tracing::info;

use crate::config::ConfigV1;
use crate::controller::AuthController;
use crate::service::{GoTrueClient, RestProfileStore};
use crate::store::{create_store, KeyValueStore};

/// Build the controller from config and an injected persisted store,
/// attach the change-notification pump, and resolve the initial state.
pub async fn build_controller(
    config: &ConfigV1,
    store: Arc<dyn KeyValueStore>,
) -> Arc<AuthController> {
    let auth = Arc::new(GoTrueClient::new(config.auth.clone(), store.clone()));
    let profiles = Arc::new(RestProfileStore::new(config.profiles.clone()));

    let controller = Arc::new(AuthController::new(auth, profiles, store));
    controller.attach();
    controller.initialize().await;
    controller
}

/// Resolve the authentication state for the configured store and report
/// it. Used by the binary as a headless session check.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let store = create_store(&config.store);
    let controller = build_controller(&config, store).await;

    info!("Resolved auth state: {}", controller.current_state().name());

    controller.shutdown();
    Ok(())
}
