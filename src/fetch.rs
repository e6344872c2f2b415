use std::fs;
use std::time::Instant;

use camino::Utf8PathBuf;
use tracing::{error, info, warn};

use crate::domain::{DatasetDescriptor, FetchAction};
use crate::error::PlacesError;
use crate::http::{Transport, user_agent};
use crate::registry::DatasetRegistry;
use crate::store::{DownloadMetadata, Layout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cached(Utf8PathBuf),
    Downloaded { path: Utf8PathBuf, bytes: u64 },
    Failed(String),
}

impl FetchOutcome {
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            FetchOutcome::Cached(path) | FetchOutcome::Downloaded { path, .. } => Some(path),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn action(&self) -> FetchAction {
        match self {
            FetchOutcome::Cached(_) => FetchAction::Cache,
            FetchOutcome::Downloaded { .. } => FetchAction::Download,
            FetchOutcome::Failed(_) => FetchAction::Failed,
        }
    }
}

pub struct Fetcher<T: Transport> {
    registry: DatasetRegistry,
    layout: Layout,
    transport: T,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(registry: DatasetRegistry, layout: Layout, transport: T) -> Self {
        Self {
            registry,
            layout,
            transport,
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fetch(&self, year: u16, force: bool) -> Result<FetchOutcome, PlacesError> {
        let descriptor = self.registry.get(year)?;
        let target = self.layout.raw_path(year);

        if !force && target.as_std_path().exists() {
            info!(year, path = %target, "file already exists, skipping download");
            return Ok(FetchOutcome::Cached(target));
        }

        info!(year, url = %descriptor.source_url, "downloading dataset");
        let start = Instant::now();
        match self.download_to(descriptor, &target) {
            Ok(bytes) => {
                info!(
                    year,
                    path = %target,
                    bytes,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "download complete"
                );
                self.record_metadata(descriptor, bytes);
                Ok(FetchOutcome::Downloaded {
                    path: target,
                    bytes,
                })
            }
            Err(err) => {
                error!(year, "error downloading data: {err}");
                Ok(FetchOutcome::Failed(err.to_string()))
            }
        }
    }

    fn download_to(
        &self,
        descriptor: &DatasetDescriptor,
        target: &Utf8PathBuf,
    ) -> Result<u64, PlacesError> {
        let parent = target
            .parent()
            .ok_or_else(|| PlacesError::Filesystem(format!("invalid target path {target}")))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| PlacesError::Filesystem(format!("create {parent}: {err}")))?;

        // Dropping `temp` on any early return removes the partial file.
        let temp = tempfile::Builder::new()
            .prefix(&format!(".places_{}", descriptor.year))
            .suffix(".part")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| PlacesError::Filesystem(err.to_string()))?;
        let bytes = self
            .transport
            .download(&descriptor.source_url, temp.path())?;
        temp.persist(target.as_std_path())
            .map_err(|err| PlacesError::Filesystem(format!("persist {target}: {err}")))?;
        Ok(bytes)
    }

    fn record_metadata(&self, descriptor: &DatasetDescriptor, bytes: u64) {
        let metadata = DownloadMetadata {
            year: descriptor.year,
            dataset_name: descriptor.dataset_name.clone(),
            source_url: descriptor.source_url.clone(),
            metadata_url: descriptor.metadata_url.clone(),
            bytes,
            downloaded_at: chrono::Utc::now().to_rfc3339(),
            tool: user_agent(),
        };
        let path = self.layout.metadata_path(descriptor.year);
        if let Err(err) = Layout::write_metadata(&path, &metadata) {
            warn!(year = descriptor.year, path = %path, "could not write download metadata: {err}");
        }
    }
}
