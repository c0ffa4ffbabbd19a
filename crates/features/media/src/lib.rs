//! Project image slice.
//!
//! Serves the images referenced by project records from a local directory or a
//! blob container.

#[cfg(feature = "server")]
pub mod api;
mod error;
pub mod store;

pub use error::{MediaError, MediaErrorExt};
pub use store::{BlobImageStore, Image, ImageStore, LocalImageStore, guess_content_type};

use folio_kernel::domain::config::ImagesConfig;
use folio_kernel::domain::registry::InitializedSlice;
use std::sync::Arc;

/// Media feature state.
#[folio_derive::folio_slice]
pub struct Media {
    pub store: Arc<dyn ImageStore>,
}

/// Builds the media slice from the `[images]` section.
///
/// # Errors
/// Fails when the blob container URL is unusable.
pub fn init(config: &ImagesConfig) -> Result<InitializedSlice, MediaError> {
    let store = store::connect(config)?;
    tracing::info!(backend = store.backend(), "Media slice initialized");
    Ok(InitializedSlice::new(Media::new(MediaInner { store })))
}
