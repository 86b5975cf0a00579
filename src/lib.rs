//! alp-dl - A library for downloading climbing route descriptions.
//!
//! The catalog is organised as mountain ranges → areas → summits → routes →
//! description documents. This crate fetches that catalog and downloads the
//! documents of selected summits into a fixed directory tree, independent of
//! any particular UI.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use alp_dl::{
//!     AppConfig, CatalogClient, DocumentFetcher, DownloadOrchestrator, HttpTransport,
//!     NoProgress, Selection,
//! };
//!
//! # async fn example() -> alp_dl::Result<()> {
//! let config = AppConfig::load()?;
//! let transport = Arc::new(HttpTransport::new(&config.catalog)?);
//!
//! let catalog = Arc::new(CatalogClient::new(Arc::clone(&transport)));
//! let ranges = catalog.fetch_ranges().await?;
//! let areas = catalog.fetch_areas(ranges[0].id).await?;
//! let summits = catalog.fetch_summits(areas[0].id).await?;
//!
//! let fetcher = Arc::new(DocumentFetcher::new(transport, config.download.chunk_size));
//! let orchestrator = DownloadOrchestrator::new(catalog, fetcher, config.download.download_dir);
//!
//! let selection = Selection::new(Some(ranges[0].id), Some(areas[0].id), vec![summits[0].id]);
//! let outcome = orchestrator.start(selection, Arc::new(NoProgress))?.await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod format;
pub mod fs;
pub mod layout;
pub mod stats;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types for convenience
pub use catalog::CatalogClient;
pub use catalog::model::{Document, MountainArea, MountainRange, Route, Summit};
pub use catalog::query::{RouteQuery, RouteQueryBuilder};
pub use catalog::transport::{FileBody, HttpTransport, Transport};
pub use config::{AppConfig, CatalogConfig, DownloadConfig};
pub use download::{
    CancelHandle, DownloadOrchestrator, DownloadProgress, DownloadStatus, NoProgress, RunOutcome,
    RunState, Selection,
};
pub use error::{Error, Result};
pub use fetch::{DocumentFetcher, FetchedDocument};
pub use format::{format_bytes, format_duration, natural_cmp};
pub use fs::{FileSystem, TokioFileSystem};
pub use stats::{RunStats, RunStatsBuilder};
