//! Storage backends behind one read-only contract.
//!
//! Exactly one backend is active per process. It is chosen from configuration by
//! [`connect`] and shared as `Arc<dyn ProjectRepository>`.

mod file;
mod sql;
pub mod table;

pub use file::FileProjectRepository;
pub use sql::SqlProjectRepository;
pub use table::TableProjectRepository;

use crate::error::CatalogError;
use crate::model::Project;
use async_trait::async_trait;
use folio_kernel::domain::config::{BackendConfig, CatalogConfig};
use std::fmt::Debug;
use std::sync::Arc;

#[async_trait]
pub trait ProjectRepository: Send + Sync + Debug {
    /// All stored projects in backend order; empty when there are none.
    async fn list_projects(&self) -> Result<Vec<Project>, CatalogError>;

    /// The project with `id`, or `None` when no such record exists.
    async fn get_project(&self, id: &str) -> Result<Option<Project>, CatalogError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Opens the backend described by `config.backend`.
///
/// # Errors
/// [`CatalogError::Storage`] (or a transport variant) when the backend cannot be
/// reached or is misconfigured; [`CatalogError::Validation`] for an unusable table name.
pub async fn connect(config: &CatalogConfig) -> Result<Arc<dyn ProjectRepository>, CatalogError> {
    let repository: Arc<dyn ProjectRepository> = match &config.backend {
        BackendConfig::Files { dir } => Arc::new(FileProjectRepository::open(dir).await?),
        BackendConfig::Sql { url, table } => Arc::new(SqlProjectRepository::connect(url, table).await?),
        BackendConfig::Table { endpoint, table, partition, sas_token } => Arc::new(
            TableProjectRepository::connect(endpoint, table, partition, sas_token.as_deref()).await?,
        ),
    };

    tracing::info!(backend = repository.backend(), "Project repository ready");
    Ok(repository)
}
