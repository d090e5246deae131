pub mod base;
pub mod gotrue;
pub mod profile_store;

// Re-export the service seams so code outside can do
// "use crate::service::{AuthService, ProfileStore};"
pub use base::{AuthChangeEvent, AuthService, AuthSubscription, ProfileStore};
pub use gotrue::{GoTrueClient, GoTrueConfig};
pub use profile_store::{ProfileStoreConfig, RestProfileStore};
