pub mod profile;
pub mod session;

// Re-export the primary model types so code outside can do
// "use crate::models::{Profile, Session};"
pub use profile::{Profile, ProfileVisibility};
pub use session::{Session, SessionUser, AUTHENTICATED_AUD};
