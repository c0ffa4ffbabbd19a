use super::ProjectRepository;
use crate::error::{CatalogError, CatalogErrorExt};
use crate::model::Project;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

/// One `{id}.json` file per project inside a single directory.
#[derive(Debug, Clone)]
pub struct FileProjectRepository {
    dir: PathBuf,
}

impl FileProjectRepository {
    /// Opens a repository rooted at `dir`, which must be an existing directory.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let repository = Self { dir: dir.as_ref().to_path_buf() };
        repository.ensure_dir().await?;

        tracing::info!(dir = %repository.dir.display(), "File project repository opened");
        Ok(repository)
    }

    /// `Storage` when the directory is gone or no longer a directory.
    async fn ensure_dir(&self) -> Result<(), CatalogError> {
        let metadata = tokio::fs::metadata(&self.dir).await.map_err(|e| CatalogError::Storage {
            message: e.to_string().into(),
            context: Some(format!("Project directory {}", self.dir.display()).into()),
        })?;

        if !metadata.is_dir() {
            return Err(CatalogError::Storage {
                message: "not a directory".into(),
                context: Some(format!("Project directory {}", self.dir.display()).into()),
            });
        }
        Ok(())
    }

    /// Path of the record for `id`, or `None` when `id` cannot name a file in the directory.
    fn record_path(&self, id: &str) -> Option<PathBuf> {
        let unsafe_id = id.is_empty() || id == ".." || id.contains(['/', '\\', '\0']);
        (!unsafe_id).then(|| self.dir.join(format!("{id}.{EXTENSION}")))
    }

    async fn read_record(path: &Path) -> Result<Option<Project>, CatalogError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(format!("Reading {}", path.display())),
        };

        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Project::from_slice(&bytes).context(file_name).map(Some)
    }
}

#[async_trait]
impl ProjectRepository for FileProjectRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, CatalogError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .context(format!("Listing {}", self.dir.display()))?;

        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await.context("Reading directory entry")? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                continue;
            }
            // A file removed between listing and reading is skipped.
            if let Some(project) = Self::read_record(&path).await? {
                projects.push(project);
            }
        }

        tracing::debug!(count = projects.len(), dir = %self.dir.display(), "Listed project files");
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, CatalogError> {
        let Some(path) = self.record_path(id) else {
            tracing::debug!(id, "Rejected project id that cannot name a file");
            return Ok(None);
        };

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {},
            // Listing skips anything that is not a regular file, so lookups do too.
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.ensure_dir().await?;
                return Ok(None);
            },
            Err(e) => return Err(e).context(format!("Inspecting {}", path.display())),
        }

        Self::read_record(&path).await
    }

    fn backend(&self) -> &'static str {
        "files"
    }
}
