//! Projects stored as entities of one partition in a cloud key-partition table.

mod client;
mod entity;

pub use client::{Entity, RestTableClient, TableClient};
pub use entity::StoredEntity;

use super::ProjectRepository;
use crate::error::CatalogError;
use crate::model::Project;
use async_trait::async_trait;
use std::sync::Arc;

/// Table-backed repository: partition key fixed by configuration, row key = project id.
#[derive(Debug, Clone)]
pub struct TableProjectRepository {
    client: Arc<dyn TableClient>,
    partition: String,
}

impl TableProjectRepository {
    /// Connects over REST and makes sure the table exists.
    pub async fn connect(
        endpoint: &str,
        table: &str,
        partition: &str,
        sas_token: Option<&str>,
    ) -> Result<Self, CatalogError> {
        for (name, value) in [("endpoint", endpoint), ("table", table), ("partition", partition)] {
            if value.trim().is_empty() {
                return Err(CatalogError::Storage {
                    message: format!("`{name}` is not configured").into(),
                    context: Some("Table backend".into()),
                });
            }
        }

        let client = RestTableClient::new(endpoint, table, sas_token)?;
        let repository = Self::with_client(Arc::new(client), partition).await?;
        tracing::info!(table, partition, "Table project repository connected");
        Ok(repository)
    }

    /// Wraps an existing client; the table is ensured once here.
    pub async fn with_client(
        client: Arc<dyn TableClient>,
        partition: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        client.ensure_table().await?;
        Ok(Self { client, partition: partition.into() })
    }
}

#[async_trait]
impl ProjectRepository for TableProjectRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, CatalogError> {
        let entities = self.client.query_partition(&self.partition).await?;
        let projects = entities
            .into_iter()
            .map(|entity| StoredEntity::from(entity).into_project())
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = projects.len(), partition = %self.partition, "Listed table entities");
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, CatalogError> {
        match self.client.get_entity(&self.partition, id).await? {
            Some(entity) => StoredEntity::from(entity).into_project().map(Some),
            None => Ok(None),
        }
    }

    fn backend(&self) -> &'static str {
        "table"
    }
}
