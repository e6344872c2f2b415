use std::fs;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::DownloadResult;
use crate::error::PlacesError;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::http::Transport;
use crate::registry::DatasetRegistry;
use crate::store::Layout;
use crate::validate::{self, ValidationReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub force: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub requested: usize,
    pub items: Vec<DownloadResult>,
}

impl BatchReport {
    pub fn paths(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.succeeded)
            .filter_map(|item| item.local_path.as_deref())
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.succeeded).count()
    }

    pub fn failed_years(&self) -> Vec<u16> {
        self.items
            .iter()
            .filter(|item| !item.succeeded)
            .map(|item| item.year)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub datasets: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub year: u16,
    pub dataset_name: String,
    pub source_url: String,
    pub local_path: Option<String>,
    pub bytes: Option<u64>,
    pub downloaded_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(
                elapsed_ms = elapsed.as_millis() as u64,
                "{}", event.message
            ),
            None => info!("{}", event.message),
        }
    }
}

pub struct App<T: Transport> {
    fetcher: Fetcher<T>,
}

impl<T: Transport> App<T> {
    pub fn new(registry: DatasetRegistry, layout: Layout, transport: T) -> Self {
        Self {
            fetcher: Fetcher::new(registry, layout, transport),
        }
    }

    pub fn registry(&self) -> &DatasetRegistry {
        self.fetcher.registry()
    }

    pub fn layout(&self) -> &Layout {
        self.fetcher.layout()
    }

    pub fn transport(&self) -> &T {
        self.fetcher.transport()
    }

    pub fn fetch_registered(
        &self,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        let years = self.registry().years();
        self.fetch_all(&years, options, sink)
    }

    pub fn fetch_all(
        &self,
        years: &[u16],
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> BatchReport {
        info!(?years, "starting download");
        let mut items = Vec::with_capacity(years.len());
        for (index, &year) in years.iter().enumerate() {
            sink.event(ProgressEvent {
                message: format!("phase=Fetch; year {year} ({}/{})", index + 1, years.len()),
                elapsed: None,
            });
            let start = Instant::now();
            let item = self.fetch_one(year, options, sink);
            if !item.succeeded {
                warn!(year, "failed to download or validate data");
            }
            sink.event(ProgressEvent {
                message: format!("phase=Done; year {year} action={}", item.action),
                elapsed: Some(start.elapsed()),
            });
            items.push(item);
        }

        let report = BatchReport {
            requested: years.len(),
            items,
        };
        info!(
            "successfully downloaded {} of {} files",
            report.succeeded(),
            report.requested
        );
        report
    }

    pub fn fetch_one(
        &self,
        year: u16,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> DownloadResult {
        let outcome = match self.fetcher.fetch(year, options.force) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(year, "error processing year: {err}");
                return DownloadResult::failed(year, None, err.to_string());
            }
        };

        let action = outcome.action();
        let path = match outcome {
            FetchOutcome::Cached(path) | FetchOutcome::Downloaded { path, .. } => path,
            FetchOutcome::Failed(reason) => {
                return DownloadResult::failed(year, None, reason);
            }
        };

        sink.event(ProgressEvent {
            message: format!("phase=Verify; validating {path}"),
            elapsed: None,
        });
        match validate::check(path.as_std_path()) {
            Ok(report) => {
                info!(year, path = %path, rows_checked = report.rows_checked, "file validated");
                DownloadResult {
                    year,
                    local_path: Some(path.to_string()),
                    succeeded: true,
                    action,
                    validated: true,
                    error: None,
                }
            }
            Err(err) => {
                error!(year, path = %path, "error validating file: {err}");
                DownloadResult {
                    year,
                    local_path: Some(path.to_string()),
                    succeeded: false,
                    action,
                    validated: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub fn inventory(&self) -> Inventory<'_> {
        Inventory::new(self.registry(), self.layout())
    }

    pub fn list(&self, sink: &dyn ProgressSink) -> Result<ListResult, PlacesError> {
        self.inventory().list(sink)
    }

    pub fn validate_year(&self, year: u16) -> Result<ValidationReport, PlacesError> {
        self.inventory().validate_year(year)
    }
}

pub struct Inventory<'a> {
    registry: &'a DatasetRegistry,
    layout: &'a Layout,
}

impl<'a> Inventory<'a> {
    pub fn new(registry: &'a DatasetRegistry, layout: &'a Layout) -> Self {
        Self { registry, layout }
    }

    pub fn list(&self, sink: &dyn ProgressSink) -> Result<ListResult, PlacesError> {
        sink.event(ProgressEvent {
            message: "phase=Resolve; scanning raw directory".to_string(),
            elapsed: None,
        });

        let mut datasets = Vec::with_capacity(self.registry.len());
        for descriptor in self.registry.iter() {
            let raw_path = self.layout.raw_path(descriptor.year);
            let bytes = match fs::metadata(raw_path.as_std_path()) {
                Ok(meta) => Some(meta.len()),
                Err(_) => None,
            };
            let downloaded_at = if bytes.is_some() {
                self.downloaded_at(descriptor.year)
            } else {
                None
            };
            datasets.push(ListEntry {
                year: descriptor.year,
                dataset_name: descriptor.dataset_name.clone(),
                source_url: descriptor.source_url.clone(),
                local_path: bytes.map(|_| raw_path.to_string()),
                bytes,
                downloaded_at,
            });
        }
        Ok(ListResult { datasets })
    }

    pub fn validate_year(&self, year: u16) -> Result<ValidationReport, PlacesError> {
        self.registry.get(year)?;
        let path = self.layout.raw_path(year);
        if !path.as_std_path().exists() {
            return Err(PlacesError::DatasetNotFound(year));
        }
        validate::check(path.as_std_path())
    }

    fn downloaded_at(&self, year: u16) -> Option<String> {
        let path = self.layout.metadata_path(year);
        match Layout::read_metadata(&path) {
            Ok(metadata) => metadata.map(|meta| meta.downloaded_at),
            Err(err) => {
                warn!(year, path = %path, "ignoring unreadable download metadata: {err}");
                None
            }
        }
    }
}
