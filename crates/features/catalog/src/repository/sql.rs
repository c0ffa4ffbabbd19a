use super::ProjectRepository;
use crate::error::{CatalogError, CatalogErrorExt};
use crate::model::Project;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Connection, Row};

const COLUMNS: &str = "id, title, image, repo_url, description, demo_url, exclude_paths";
const TEXT_COLUMNS: [&str; 6] = ["id", "title", "image", "repo_url", "description", "demo_url"];

/// Relational table reached through the `sqlx` Any driver (`sqlite:` or `postgres:` URLs).
///
/// Every call opens its own connection and closes it before returning.
pub struct SqlProjectRepository {
    url: String,
    table: String,
    select_all: String,
    select_one: String,
}

impl std::fmt::Debug for SqlProjectRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL may carry credentials.
        f.debug_struct("SqlProjectRepository").field("table", &self.table).finish_non_exhaustive()
    }
}

impl SqlProjectRepository {
    /// Installs the Any drivers and checks connectivity once.
    pub async fn connect(url: &str, table: &str) -> Result<Self, CatalogError> {
        if url.trim().is_empty() {
            return Err(CatalogError::Storage {
                message: "database URL is empty".into(),
                context: Some("SQL backend".into()),
            });
        }
        if !is_identifier(table) {
            return Err(CatalogError::Validation {
                message: format!("`{table}` is not a plain SQL identifier").into(),
                context: Some("SQL backend table name".into()),
            });
        }

        sqlx::any::install_default_drivers();

        let repository = Self {
            url: url.to_owned(),
            table: table.to_owned(),
            select_all: format!("SELECT {COLUMNS} FROM {table}"),
            select_one: format!("SELECT {COLUMNS} FROM {table} WHERE id = $1"),
        };

        let conn = repository.open().await?;
        conn.close().await.context("Closing probe connection")?;

        tracing::info!(table, "SQL project repository connected");
        Ok(repository)
    }

    async fn open(&self) -> Result<AnyConnection, CatalogError> {
        AnyConnection::connect(&self.url).await.context(format!("Connecting for table {}", self.table))
    }
}

#[async_trait]
impl ProjectRepository for SqlProjectRepository {
    async fn list_projects(&self) -> Result<Vec<Project>, CatalogError> {
        let mut conn = self.open().await?;
        let rows = sqlx::query(&self.select_all)
            .fetch_all(&mut conn)
            .await
            .context(format!("Listing {}", self.table))?;
        conn.close().await.context("Closing connection")?;

        let projects = rows.iter().map(project_from_row).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = projects.len(), table = %self.table, "Listed project rows");
        Ok(projects)
    }

    async fn get_project(&self, id: &str) -> Result<Option<Project>, CatalogError> {
        let mut conn = self.open().await?;
        let row = sqlx::query(&self.select_one)
            .bind(id)
            .fetch_optional(&mut conn)
            .await
            .context(format!("Loading {id} from {}", self.table))?;
        conn.close().await.context("Closing connection")?;

        row.as_ref().map(project_from_row).transpose()
    }

    fn backend(&self) -> &'static str {
        "sql"
    }
}

/// Converts a row into the JSON object shape every backend validates.
fn project_from_row(row: &AnyRow) -> Result<Project, CatalogError> {
    let mut object = Map::new();
    for column in TEXT_COLUMNS {
        let value: Option<String> = row.try_get(column).context(format!("Column {column}"))?;
        object.insert(column.to_owned(), value.map_or(Value::Null, Value::String));
    }

    let id = object.get("id").and_then(Value::as_str).unwrap_or_default().to_owned();

    let exclude_paths: Option<String> = row.try_get("exclude_paths").context("Column exclude_paths")?;
    let exclude_paths = match exclude_paths {
        Some(text) => serde_json::from_str::<Value>(&text).map_err(|e| CatalogError::Validation {
            message: format!("exclude_paths is not JSON: {e}").into(),
            context: Some(id.clone().into()),
        })?,
        None => Value::Null,
    };
    object.insert("exclude_paths".to_owned(), exclude_paths);

    Project::from_value(Value::Object(object)).context(id)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
