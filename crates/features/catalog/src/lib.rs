//! Project catalog slice.
//!
//! Reads project records from the configured backend, merges each project's
//! exclusions with the global omissions and serves the result over HTTP.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), folio_catalog::CatalogError> {
//! use folio_catalog::{CatalogService, OmissionsSource, repository::FileProjectRepository};
//! use std::sync::Arc;
//!
//! let repository = Arc::new(FileProjectRepository::open("project_store/projects").await?);
//! let service = CatalogService::new(repository, OmissionsSource::default());
//! for view in service.list_projects().await? {
//!     println!("{} hides {:?}", view.project.id, view.effective_exclude_paths);
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "server")]
pub mod api;
mod error;
pub mod exclusions;
mod model;
mod omissions;
pub mod repository;
mod service;

pub use error::{CatalogError, CatalogErrorExt, ErrorKind};
pub use exclusions::effective_exclusions;
pub use model::{Project, ProjectView};
pub use omissions::OmissionsSource;
pub use repository::ProjectRepository;
pub use service::CatalogService;

use folio_kernel::domain::config::CatalogConfig;
use folio_kernel::domain::registry::InitializedSlice;

/// Catalog feature state.
#[folio_derive::folio_slice]
pub struct Catalog {
    pub service: CatalogService,
}

/// Opens the configured backend and builds the catalog slice.
///
/// # Errors
/// Fails when the backend cannot be reached or is misconfigured.
pub async fn init(config: &CatalogConfig) -> Result<InitializedSlice, CatalogError> {
    let repository = repository::connect(config).await?;
    let omissions = OmissionsSource::new(config.omissions_path.clone());

    tracing::info!(
        backend = repository.backend(),
        omissions = ?omissions.path(),
        "Catalog slice initialized"
    );

    let service = CatalogService::new(repository, omissions);
    Ok(InitializedSlice::new(Catalog::new(CatalogInner { service })))
}
