#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the memogate application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors;
pub mod guard;
pub mod handlers;
pub mod memo;
pub mod oauth;
pub mod routes;
pub mod session;
pub mod settings;
pub mod utils;

/// Re-export commonly used items
pub use errors::CallbackError;
pub use guard::{GuardDecision, RouteGuard};
pub use handlers::configure_services;
pub use oauth::{OAuthConfig, OAuthIdentity, OAuthProvider};
pub use session::SessionIssuer;
pub use settings::MemogateSettings;
