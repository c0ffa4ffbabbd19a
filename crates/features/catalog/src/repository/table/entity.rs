use crate::error::{CatalogError, CatalogErrorExt};
use crate::model::Project;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Column holding a whole project serialized as JSON.
const DATA_COLUMN: &str = "data";
const ROW_KEY: &str = "RowKey";
const SERVICE_COLUMNS: [&str; 3] = ["PartitionKey", "RowKey", "Timestamp"];

/// A project entity as returned by the table service.
///
/// Two layouts exist in the wild: the whole record serialized into a `data`
/// column, or one column per field. A non-empty string `data` column wins.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub enum StoredEntity {
    Blob { row_key: Option<String>, data: String },
    Columns(Map<String, Value>),
}

impl From<Map<String, Value>> for StoredEntity {
    fn from(mut entity: Map<String, Value>) -> Self {
        match entity.get(DATA_COLUMN) {
            Some(Value::String(data)) if !data.is_empty() => Self::Blob {
                row_key: entity.get(ROW_KEY).and_then(Value::as_str).map(str::to_owned),
                data: data.clone(),
            },
            _ => {
                if !entity.contains_key("id")
                    && let Some(row_key) = entity.get(ROW_KEY).cloned()
                {
                    entity.insert("id".to_owned(), row_key);
                }
                entity.retain(|key, _| !is_service_column(key));
                Self::Columns(entity)
            },
        }
    }
}

impl StoredEntity {
    /// Decodes the entity into a validated project.
    ///
    /// A string `exclude_paths` holds a JSON list; when it cannot be parsed the
    /// record is still served with an empty list and a warning is logged.
    pub fn into_project(self) -> Result<Project, CatalogError> {
        let (label, mut object) = match self {
            Self::Blob { row_key, data } => {
                let label = row_key.unwrap_or_default();
                let value: Value = serde_json::from_str(&data).map_err(|e| CatalogError::Validation {
                    message: format!("`{DATA_COLUMN}` column is not JSON: {e}").into(),
                    context: Some(label.clone().into()),
                })?;
                let Value::Object(object) = value else {
                    return Err(CatalogError::Validation {
                        message: format!("`{DATA_COLUMN}` column is not a JSON object").into(),
                        context: Some(label.into()),
                    });
                };
                (label, object)
            },
            Self::Columns(object) => {
                let label = object.get("id").and_then(Value::as_str).unwrap_or_default().to_owned();
                (label, object)
            },
        };

        if let Some(Value::String(text)) = object.get("exclude_paths") {
            let parsed = lenient_paths(&label, text);
            object.insert("exclude_paths".to_owned(), parsed);
        }

        Project::from_value(Value::Object(object)).context(label)
    }
}

fn lenient_paths(label: &str, text: &str) -> Value {
    match serde_json::from_str::<Vec<String>>(text) {
        Ok(paths) => Value::from(paths),
        Err(e) => {
            tracing::warn!(project = label, error = %e, "Unparseable exclude_paths; serving an empty list");
            Value::Array(Vec::new())
        },
    }
}

fn is_service_column(key: &str) -> bool {
    SERVICE_COLUMNS.contains(&key) || key.starts_with("odata.") || key.ends_with("@odata.type")
}
