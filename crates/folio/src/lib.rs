//! Facade crate for Folio features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it composes other crates and holds no business logic.

pub use folio_domain as domain;
pub use folio_kernel as kernel;

use folio_domain::config::ApiConfig;
use folio_domain::registry::InitializedSlice;
use std::borrow::Cow;

/// Feature crates, re-exported for direct use.
pub mod features {
    pub use folio_catalog as catalog;
    pub use folio_media as media;

    /// Slices registered by [`init`](super::init).
    pub const ENABLED: &[&str] = &["catalog", "media"];
}

#[cfg(feature = "server")]
pub mod server {
    use folio_kernel::server::ApiState;
    use utoipa_axum::router::OpenApiRouter;

    /// Every documented route: system endpoints plus each slice's handlers.
    #[must_use]
    pub fn router() -> OpenApiRouter<ApiState> {
        folio_kernel::server::system_router()
            .merge(folio_catalog::api::router())
            .merge(folio_media::api::router())
    }
}

#[folio_derive::folio_error]
pub enum PlatformError {
    #[error("Catalog bootstrap failed{}: {source}", format_context(.context))]
    Catalog { source: folio_catalog::CatalogError, context: Option<Cow<'static, str>> },

    #[error("Media bootstrap failed{}: {source}", format_context(.context))]
    Media { source: folio_media::MediaError, context: Option<Cow<'static, str>> },
}

/// Initializes every feature slice from configuration.
///
/// # Errors
/// Returns the first slice failure (unreachable backend, invalid settings).
pub async fn init(config: &ApiConfig) -> Result<Vec<InitializedSlice>, PlatformError> {
    let slices = vec![
        folio_catalog::init(&config.catalog).await.context("catalog")?,
        folio_media::init(&config.images).context("media")?,
    ];

    tracing::info!(slices = slices.len(), "Feature slices initialized");
    Ok(slices)
}
