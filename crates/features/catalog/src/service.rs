use crate::error::CatalogError;
use crate::exclusions::effective_exclusions;
use crate::model::{Project, ProjectView};
use crate::omissions::OmissionsSource;
use crate::repository::ProjectRepository;
use std::sync::Arc;

/// Read-side facade used by the HTTP handlers.
#[derive(Debug, Clone)]
pub struct CatalogService {
    repository: Arc<dyn ProjectRepository>,
    omissions: OmissionsSource,
}

impl CatalogService {
    #[must_use]
    pub fn new(repository: Arc<dyn ProjectRepository>, omissions: OmissionsSource) -> Self {
        Self { repository, omissions }
    }

    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }

    /// Every project with its effective exclusions, ordered by id.
    pub async fn list_projects(&self) -> Result<Vec<ProjectView>, CatalogError> {
        let mut projects = self.repository.list_projects().await?;
        let global = self.omissions.load().await?;
        projects.sort_by(|a, b| a.id.cmp(&b.id));

        tracing::debug!(
            backend = self.backend(),
            projects = projects.len(),
            omissions = global.len(),
            "Listing projects"
        );
        Ok(projects.into_iter().map(|project| view(project, &global)).collect())
    }

    /// One project with its effective exclusions, `None` when unknown.
    pub async fn get_project(&self, id: &str) -> Result<Option<ProjectView>, CatalogError> {
        let Some(project) = self.repository.get_project(id).await? else {
            tracing::debug!(backend = self.backend(), id, "Project not found");
            return Ok(None);
        };
        let global = self.omissions.load().await?;

        tracing::debug!(backend = self.backend(), id, omissions = global.len(), "Loaded project");
        Ok(Some(view(project, &global)))
    }

    /// The global omissions as stored.
    pub async fn global_omissions(&self) -> Result<Vec<String>, CatalogError> {
        let global = self.omissions.load().await?;
        tracing::debug!(omissions = global.len(), "Loaded global omissions");
        Ok(global)
    }
}

fn view(project: Project, global: &[String]) -> ProjectView {
    let effective_exclude_paths = effective_exclusions(&project, global);
    ProjectView { project, effective_exclude_paths }
}
