//! Shared string constants (`OpenAPI` tags, defaults).

pub const SYSTEM_TAG: &str = "System";
pub const CATALOG_TAG: &str = "Catalog";
pub const MEDIA_TAG: &str = "Media";

/// Partition key used by the cloud table store when none is configured.
pub const DEFAULT_PARTITION: &str = "projects";
/// Relational/cloud table name used when none is configured.
pub const DEFAULT_TABLE: &str = "projects";
