//! Kernel utilities shared across slices.
//! Keep this crate lightweight: it owns config loading and, behind the `server`
//! feature, the shared API state, error responses and the health route.
//!
//! ## Config loading
//! ```rust,no_run
//! use folio_kernel::config::load_config;
//! use folio_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("folio.toml")).unwrap_or_default();
//! assert!(cfg.server.port > 0);
//! ```
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use folio_domain as domain;
