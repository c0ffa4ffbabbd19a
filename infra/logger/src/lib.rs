//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: a compact ANSI console layer and,
//! when a directory is configured, a daily-rolling file layer written through a
//! non-blocking worker. `RUST_LOG` always takes precedence over the configured
//! default directive.
//!
//! ## Example
//!
//! ```rust
//! # use folio_logger::Logger;
//! let _logger = Logger::builder("folio").directive("info,folio_catalog=debug").init().unwrap();
//! tracing::info!("ready");
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing_appender::rolling::Rotation;

use folio_domain::config::LoggingConfig;
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_DIRECTIVE: &str = "info";
const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Builder state: console output only.
#[derive(Debug)]
pub struct ConsoleOnly;

/// Builder state: a log directory was supplied, file options are available.
#[derive(Debug)]
pub struct WithFiles;

#[derive(Debug)]
struct Settings {
    name: String,
    directive: String,
    console: bool,
    dir: Option<PathBuf>,
    rotation: Rotation,
    max_files: usize,
    json: bool,
}

/// Configures and installs the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<F = ConsoleOnly> {
    settings: Settings,
    state: PhantomData<F>,
}

impl<F> LoggerBuilder<F> {
    /// Default filter directive (`info`, `warn,folio_catalog=debug`, ...). `RUST_LOG` wins when set.
    #[must_use = "The builder must be initialized to take effect."]
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.settings.directive = directive.into();
        self
    }

    #[must_use = "The builder must be initialized to take effect."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.settings.console = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file writer guard; keep it alive for the
    /// lifetime of the process so buffered lines are flushed on shutdown.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an empty name, a malformed directive or
    /// when no output is enabled; [`LoggerError::Subscriber`] if a subscriber is
    /// already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let settings = self.settings;
        validate(&settings)?;

        let filter = env_filter(&settings.directive)?;
        let mut layers = Vec::new();

        if settings.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &settings.dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Failed to create log directory {}", dir.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(settings.rotation.clone())
                    .filename_prefix(&settings.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(settings.max_files)
                    .build(dir)
                    .context("Failed to build rolling appender")?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if settings.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled; enable the console or set a directory".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }
}

impl LoggerBuilder<ConsoleOnly> {
    /// Adds a rolling file layer writing `{name}.{date}.log` into `dir`.
    #[must_use = "The builder must be initialized to take effect."]
    pub fn dir(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithFiles> {
        let mut settings = self.settings;
        settings.dir = Some(dir.into());
        LoggerBuilder { settings, state: PhantomData }
    }
}

impl LoggerBuilder<WithFiles> {
    /// Writes file lines as JSON objects instead of plain text.
    #[must_use = "The builder must be initialized to take effect."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.settings.json = enabled;
        self
    }

    #[must_use = "The builder must be initialized to take effect."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.settings.max_files = max;
        self
    }

    #[must_use = "The builder must be initialized to take effect."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.settings.rotation = rotation;
        self
    }
}

/// Handle to the installed logging system. Dropping it flushes and stops the file worker.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` prefixes rolling log files.
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            settings: Settings {
                name: name.into(),
                directive: DEFAULT_DIRECTIVE.to_owned(),
                console: true,
                dir: None,
                rotation: Rotation::DAILY,
                max_files: DEFAULT_MAX_FILES,
                json: false,
            },
            state: PhantomData,
        }
    }

    /// Installs the subscriber described by the `[logging]` config section.
    ///
    /// # Errors
    /// See [`LoggerBuilder::init`].
    pub fn from_config(name: impl Into<String>, config: &LoggingConfig) -> Result<Self, LoggerError> {
        let builder = Self::builder(name).directive(config.level.clone());
        match &config.dir {
            Some(dir) => builder.dir(dir).json(config.json).init(),
            None => builder.init(),
        }
    }

    /// Whether a file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn validate(settings: &Settings) -> Result<(), LoggerError> {
    if settings.name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if settings.dir.is_some() && settings.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn env_filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    if let Ok(from_env) = std::env::var(EnvFilter::DEFAULT_ENV)
        && !from_env.trim().is_empty()
    {
        return Ok(EnvFilter::builder().parse_lossy(from_env));
    }

    EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid log directive '{directive}': {e}").into(),
        context: None,
    })
}
