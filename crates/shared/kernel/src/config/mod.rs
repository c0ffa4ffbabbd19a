use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default config file, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Env var that points at an alternative config file.
pub const CONFIG_PATH_VAR: &str = "FOLIO_CONFIG";

/// Prefix of env overrides, e.g. `FOLIO__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "FOLIO";

#[folio_derive::folio_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Resolves the config file path: explicit argument, then `FOLIO_CONFIG`, then `folio.toml`.
#[must_use]
pub fn config_path(path: Option<impl AsRef<Path>>) -> PathBuf {
    path.map(|p| p.as_ref().to_path_buf())
        .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Loads configuration by layering environment overrides on top of an optional file.
///
/// 1. **File**: settings from `path` (see [`config_path`]). A missing file is not an
///    error; every section falls back to its defaults.
/// 2. **Environment**: variables prefixed with `FOLIO__`. Nested keys use double
///    underscores (`FOLIO__CATALOG__BACKEND__KIND=sql` maps to `catalog.backend.kind`).
///    `FOLIO__SERVER__CORS_ORIGINS` accepts a comma-separated list.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed, or if the merged
/// values do not match the structure of `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = config_path(path);

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.cors_origins")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
