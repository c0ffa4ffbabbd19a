use crate::error::{MediaError, MediaErrorExt};
use async_trait::async_trait;
use folio_kernel::domain::config::ImagesConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Image bytes with the content type to serve them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync + Debug {
    /// The image stored under `name`, `None` when absent or when `name` is not allowed.
    async fn fetch(&self, name: &str) -> Result<Option<Image>, MediaError>;

    fn backend(&self) -> &'static str;
}

/// Opens the store described by the `[images]` section.
pub fn connect(config: &ImagesConfig) -> Result<Arc<dyn ImageStore>, MediaError> {
    let store: Arc<dyn ImageStore> = match config {
        ImagesConfig::Local { dir } => Arc::new(LocalImageStore::new(dir)),
        ImagesConfig::Blob { container_url, sas_token } => {
            Arc::new(BlobImageStore::new(container_url, sas_token.as_deref())?)
        },
    };
    tracing::info!(backend = store.backend(), "Image store ready");
    Ok(store)
}

/// Content type derived from the file extension.
#[must_use]
pub fn guess_content_type(name: &str) -> &'static str {
    let extension = Path::new(name).extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Collapses `.`/`..` lexically; `None` when the name is empty, absolute or climbs above the root.
fn sandboxed(name: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            },
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!out.as_os_str().is_empty() && !name.contains('\0')).then_some(out)
}

/// Images under a local directory. Names never resolve outside it.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Image directory does not exist; every lookup will miss");
        }
        Self { root }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn fetch(&self, name: &str) -> Result<Option<Image>, MediaError> {
        let Some(relative) = sandboxed(name) else {
            tracing::warn!(name, "Rejected image path outside the image directory");
            return Ok(None);
        };

        let candidate = self.root.join(&relative);
        let resolved = match tokio::fs::canonicalize(&candidate).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(format!("Resolving {}", candidate.display())),
        };
        // Symlinks may still point elsewhere.
        let root = tokio::fs::canonicalize(&self.root).await.context("Resolving image directory")?;
        if !resolved.starts_with(&root) {
            tracing::warn!(name, "Rejected image resolving outside the image directory");
            return Ok(None);
        }
        if !tokio::fs::metadata(&resolved).await.is_ok_and(|m| m.is_file()) {
            return Ok(None);
        }

        let bytes = tokio::fs::read(&resolved).await.context(format!("Reading {}", resolved.display()))?;
        Ok(Some(Image { bytes, content_type: guess_content_type(name).to_owned() }))
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

/// Images stored as blobs of one container, fetched over HTTPS.
pub struct BlobImageStore {
    http: Client,
    container: Url,
    sas_token: Option<String>,
}

impl Debug for BlobImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobImageStore")
            .field("container", &self.container.as_str())
            .field("sas_token", &self.sas_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl BlobImageStore {
    pub fn new(container_url: &str, sas_token: Option<&str>) -> Result<Self, MediaError> {
        let container = Url::parse(container_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| MediaError::Internal {
                message: format!("`{container_url}` is not a usable container URL").into(),
                context: Some("Blob image store".into()),
            })?;

        let http = Client::builder().timeout(REQUEST_TIMEOUT).build().context("Building blob HTTP client")?;

        Ok(Self {
            http,
            container,
            sas_token: sas_token.map(|t| t.trim_start_matches('?').to_owned()).filter(|t| !t.is_empty()),
        })
    }

    fn blob_url(&self, relative: &Path) -> Result<Url, MediaError> {
        let mut url = self.container.clone();
        {
            let mut segments =
                url.path_segments_mut().map_err(|()| "container URL cannot carry a path")?;
            segments.pop_if_empty();
            for component in relative.components() {
                segments.push(&component.as_os_str().to_string_lossy());
            }
        }
        url.set_query(self.sas_token.as_deref());
        Ok(url)
    }
}

#[async_trait]
impl ImageStore for BlobImageStore {
    async fn fetch(&self, name: &str) -> Result<Option<Image>, MediaError> {
        let Some(relative) = sandboxed(name) else {
            tracing::warn!(name, "Rejected blob name");
            return Ok(None);
        };

        let response =
            self.http.get(self.blob_url(&relative)?).send().await.context(format!("Fetching blob {name}"))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
                    .map_or_else(|| guess_content_type(name).to_owned(), str::to_owned);
                let bytes = response.bytes().await.context(format!("Reading blob {name}"))?;
                Ok(Some(Image { bytes: bytes.to_vec(), content_type }))
            },
            status => Err(MediaError::Remote {
                message: status.to_string().into(),
                context: Some(format!("Fetching blob {name}").into()),
            }),
        }
    }

    fn backend(&self) -> &'static str {
        "blob"
    }
}
