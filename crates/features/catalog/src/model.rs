use crate::error::CatalogError;
use folio_derive::api_model;
use serde_json::Value;

/// A portfolio entry as stored by every backend.
///
/// Records are only ever built through [`Project::from_value`], so each backend
/// applies the same validation. Unknown keys in stored records are ignored.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct Project {
    /// Stable identifier; file name, primary key or row key depending on the backend
    pub id: String,
    pub title: String,
    /// Relative image path or blob name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub repo_url: String,
    pub description: String,
    pub demo_url: String,
    /// Paths hidden from this project in addition to the global omissions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_paths: Option<Vec<String>>,
}

impl Project {
    /// Validates a decoded JSON object and builds a project from it.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] when a required field is missing or mistyped,
    /// `exclude_paths` is not a list of strings, or `id` is empty.
    pub fn from_value(value: Value) -> Result<Self, CatalogError> {
        let project: Self =
            serde_json::from_value(value).map_err(|e| CatalogError::validation(e.to_string()))?;

        if project.id.is_empty() {
            return Err(CatalogError::validation("`id` must not be empty"));
        }

        Ok(project)
    }

    /// Parses raw JSON bytes (a stored file or blob column) into a project.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] for undecodable JSON or an invalid record.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CatalogError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| CatalogError::validation(e.to_string()))?;
        Self::from_value(value)
    }

    /// Per-project exclusions, empty when none are stored.
    #[must_use]
    pub fn exclude_paths(&self) -> &[String] {
        self.exclude_paths.as_deref().unwrap_or_default()
    }
}

/// Response shape: the stored project plus the reconciled exclusion list.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    /// Sorted, duplicate-free union of the global omissions and `exclude_paths`
    pub effective_exclude_paths: Vec<String>,
}
