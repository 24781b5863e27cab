//! Promisance HTTP host.
//!
//! Every request passes through [`middleware::identity::resolve_identity`],
//! which attaches an [`Identity`] (authenticated or anonymous) to the
//! request. Handlers read it with the [`Identity`] extractor.

pub mod auth;
pub mod housekeeping;
pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::identity::Identity;
pub use state::AppState;
