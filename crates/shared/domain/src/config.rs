use crate::constants::{DEFAULT_PARTITION, DEFAULT_TABLE};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub catalog: CatalogConfig,
    pub images: ImagesConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Built frontend served as the fallback route when the directory exists.
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins; `["*"]` allows any, empty disables the layer.
    pub cors_origins: Vec<String>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive (`RUST_LOG` still wins).
    pub level: String,
    /// Rolling log files are written here when set.
    pub dir: Option<PathBuf>,
    pub json: bool,
}

/// Project catalog settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub backend: BackendConfig,
    /// JSON array of paths hidden from every project. Missing file means none.
    pub omissions_path: Option<PathBuf>,
}

/// Storage backend holding the project records. Exactly one is active.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// One `{id}.json` file per project.
    Files { dir: PathBuf },
    /// Relational table reached through an `sqlx` Any URL (`sqlite:` / `postgres:`).
    Sql {
        url: String,
        #[serde(default = "default_table")]
        table: String,
    },
    /// Azure Table Storage compatible endpoint.
    Table {
        endpoint: String,
        #[serde(default = "default_table")]
        table: String,
        #[serde(default = "default_partition")]
        partition: String,
        #[serde(default)]
        sas_token: Option<String>,
    },
}

/// Where project images are read from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImagesConfig {
    Local {
        dir: PathBuf,
    },
    Blob {
        container_url: String,
        #[serde(default)]
        sas_token: Option<String>,
    },
}

fn default_table() -> String {
    DEFAULT_TABLE.to_owned()
}

fn default_partition() -> String {
    DEFAULT_PARTITION.to_owned()
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            ssl: None,
            static_dir: Some(PathBuf::from("frontend/dist")),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), dir: None, json: false }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            omissions_path: Some(PathBuf::from("project_store/global_omissions.json")),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Files { dir: PathBuf::from("project_store/projects") }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self::Local { dir: PathBuf::from("project_store/images") }
    }
}
