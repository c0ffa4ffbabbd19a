use std::borrow::Cow;

/// Errors raised by the catalog slice.
///
/// Not-found is never an error: lookups return `Ok(None)`.
#[folio_derive::folio_error]
pub enum CatalogError {
    /// A stored record is malformed (missing field, wrong type, undecodable JSON).
    #[error("Invalid project record{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The storage medium is unreachable or misconfigured.
    #[error("Project storage unavailable{}: {message}", format_context(.context))]
    Storage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Database error{}: {source}", format_context(.context))]
    Sql { source: sqlx::Error, context: Option<Cow<'static, str>> },

    #[error("Table service request failed{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },
}

/// Coarse classification used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Storage,
}

impl CatalogError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Storage { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Storage { .. } | Self::Io { .. } | Self::Sql { .. } | Self::Http { .. } => {
                ErrorKind::Storage
            },
        }
    }
}
