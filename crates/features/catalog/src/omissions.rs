use crate::error::{CatalogError, CatalogErrorExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Process-wide list of paths hidden from every project.
///
/// The file is a top-level JSON array of strings. It is re-read on every call so
/// edits take effect without a restart; a missing file means no omissions.
#[derive(Debug, Clone, Default)]
pub struct OmissionsSource {
    path: Option<PathBuf>,
}

impl OmissionsSource {
    #[must_use]
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the current omissions.
    ///
    /// # Errors
    /// [`CatalogError::Io`] when the file exists but cannot be read;
    /// [`CatalogError::Validation`] when it is not a JSON array of strings.
    pub async fn load(&self) -> Result<Vec<String>, CatalogError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context(format!("Reading {}", path.display())),
        };

        serde_json::from_slice::<Vec<String>>(&bytes).map_err(|e| CatalogError::Validation {
            message: e.to_string().into(),
            context: Some(format!("Global omissions {}", path.display()).into()),
        })
    }
}
