//! Mirror orchestrator.
//!
//! Runs each requested resource kind to completion before starting the
//! next: acquire, persist, then extract and download images.
//!
//! # Failure policy
//!
//! A fetch that exhausts its retries aborts only the resource kind it belongs
//! to. Files already written stay on disk, the failure is recorded in the
//! [`MirrorReport`], and the run continues with the next kind.
//!
//! # Resumption
//!
//! With `skip_existing`, a resource file that already exists is never
//! refetched (whole file for flat kinds, per identifier for bucketed kinds).
//! Its contents are not checked against the server.

mod options;
mod report;

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub use options::MirrorOptions;
pub use report::{KindReport, KindStatus, MirrorReport};

use crate::acquire::{self, AcquireContext, IdentifierSource, walk_identifiers};
use crate::fetch::{ApiClient, FetchError};
use crate::images::{DownloadTally, ImageDownloader};
use crate::json_file::{JsonFileError, load_json_file, save_json_file};
use crate::layout;
use crate::resource::{ResourceKind, ResourceRegistry, ResourceSpec};

/// Errors that abort one resource kind.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A request exhausted its retries or was unrecoverable.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A snapshot could not be written or reloaded.
    #[error(transparent)]
    JsonFile(#[from] JsonFileError),
}

/// Mirrors resource kinds onto disk according to [`MirrorOptions`].
#[derive(Debug)]
pub struct Mirror {
    options: MirrorOptions,
    registry: ResourceRegistry,
    client: ApiClient,
    downloader: ImageDownloader,
}

impl Mirror {
    /// Creates an orchestrator over the default resource registry.
    #[must_use]
    pub fn new(options: MirrorOptions) -> Self {
        Self::with_registry(options, ResourceRegistry::default())
    }

    /// Creates an orchestrator over a custom registry.
    #[must_use]
    pub fn with_registry(options: MirrorOptions, registry: ResourceRegistry) -> Self {
        let client = ApiClient::new(options.backoff.clone());
        let downloader = ImageDownloader::new(
            client.clone(),
            options.image_rewriter.clone(),
            options.image_delay,
        );
        Self {
            options,
            registry,
            client,
            downloader,
        }
    }

    /// Returns the options this mirror runs with.
    #[must_use]
    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Mirrors every requested kind and reports what happened to each.
    #[instrument(skip(self), fields(target = %self.options.target_dir.display()))]
    pub async fn run(&self) -> MirrorReport {
        let kinds: Vec<ResourceKind> = if self.options.kinds.is_empty() {
            self.registry.kinds().collect()
        } else {
            self.options.kinds.clone()
        };
        info!(kinds = kinds.len(), "starting mirror");

        let mut report = MirrorReport::default();
        for kind in kinds {
            report.kinds.push(self.mirror_kind(kind).await);
        }

        let images = report.image_totals();
        info!(
            mirrored = report.mirrored_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            images_downloaded = images.downloaded,
            images_errored = images.errored,
            "mirror complete"
        );
        report
    }

    /// Mirrors one kind, converting any error into a failed report.
    #[instrument(skip(self), fields(resource = %kind))]
    pub async fn mirror_kind(&self, kind: ResourceKind) -> KindReport {
        let Some(spec) = self.registry.get(kind) else {
            error!(resource = %kind, "unable to download data for unregistered resource");
            return KindReport::unsupported(kind);
        };

        let result = if spec.acquisition.is_bucketed() {
            self.mirror_bucketed(spec).await
        } else {
            self.mirror_flat(spec).await
        };

        result.unwrap_or_else(|e| {
            error!(resource = %kind, error = %e, "failed to mirror resource; continuing");
            KindReport::failed(kind, e)
        })
    }

    fn context(&self) -> AcquireContext<'_> {
        AcquireContext {
            client: &self.client,
            api_key: &self.options.api_key,
            endpoints: &self.options.endpoints,
            request_delay: self.options.request_delay,
        }
    }

    async fn mirror_flat(&self, spec: &ResourceSpec) -> Result<KindReport, MirrorError> {
        let kind = spec.kind;
        let path = layout::flat_resource_path(&self.options.target_dir, kind.as_str());

        let (status, items) = if self.options.skip_existing && path.exists() {
            info!(resource = %kind, path = %path.display(), "skipping existing resource");
            if !self.options.download_images {
                return Ok(KindReport::new(kind, KindStatus::Skipped, 0));
            }
            (KindStatus::Skipped, records_of(load_json_file(&path)?))
        } else {
            let items = acquire::collect(&self.context(), &spec.acquisition).await?;
            save_json_file(&items, &path)?;
            if items.is_empty() {
                warn!(resource = %kind, "no items retrieved");
            } else {
                info!(resource = %kind, count = items.len(), "saved resource");
            }
            (KindStatus::Mirrored, items)
        };

        let mut report = KindReport::new(kind, status, items.len());
        report.images = self.download_images(spec, &items).await;
        Ok(report)
    }

    async fn mirror_bucketed(&self, spec: &ResourceSpec) -> Result<KindReport, MirrorError> {
        let kind = spec.kind;
        let Some((source, registry_bound)) = IdentifierSource::for_acquisition(&spec.acquisition)
        else {
            return Ok(KindReport::new(kind, KindStatus::Mirrored, 0));
        };
        let max_id = self.options.max_identifier.unwrap_or(registry_bound);
        let target = self.options.target_dir.as_path();
        let name = kind.as_str();
        let skip_existing = self.options.skip_existing;

        let tally = walk_identifiers::<MirrorError, _, _>(
            &self.context(),
            &source,
            max_id,
            |id| skip_existing && layout::identifier_path(target, name, id).exists(),
            |id, record| {
                save_json_file(&record, &layout::identifier_path(target, name, id))?;
                Ok(())
            },
        )
        .await?;

        let status = if tally.fetched == 0 && tally.skipped > 0 {
            KindStatus::Skipped
        } else {
            KindStatus::Mirrored
        };
        if tally.fetched == 0 && tally.skipped == 0 {
            warn!(resource = %kind, "no items retrieved");
        } else {
            info!(
                resource = %kind,
                fetched = tally.fetched,
                skipped = tally.skipped,
                "saved resource"
            );
        }

        let mut report = KindReport::new(kind, status, tally.fetched);
        if self.options.download_images {
            let items = reload_bucketed(target, name, max_id);
            report.images = self.download_images(spec, &items).await;
        }
        Ok(report)
    }

    async fn download_images(&self, spec: &ResourceSpec, items: &[Value]) -> Option<DownloadTally> {
        if !self.options.download_images {
            return None;
        }

        let kind = spec.kind;
        let urls = self.registry.extract_images(kind, items);
        if urls.is_empty() {
            warn!(resource = %kind, "no images found");
            return Some(DownloadTally::default());
        }

        info!(resource = %kind, count = urls.len(), "downloading images");
        let tally = self
            .downloader
            .download_all(
                &urls,
                &layout::images_dir(&self.options.target_dir),
                self.options.overwrite_images,
            )
            .await;
        info!(
            resource = %kind,
            downloaded = tally.downloaded,
            skipped = tally.skipped,
            errored = tally.errored,
            "images complete"
        );
        Some(tally)
    }
}

/// Flattens a reloaded snapshot into records.
fn records_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        Value::Null => Vec::new(),
        record => vec![record],
    }
}

/// Reloads every identifier file of a bucketed kind that exists on disk.
///
/// Unreadable files are logged and left out.
fn reload_bucketed(target: &Path, name: &str, max_id: u64) -> Vec<Value> {
    let mut items = Vec::new();
    for id in 1..=max_id {
        let path = layout::identifier_path(target, name, id);
        if !path.is_file() {
            continue;
        }
        match load_json_file(&path) {
            Ok(value) => items.extend(records_of(value)),
            Err(e) => warn!(path = %path.display(), error = %e, "unable to reload snapshot"),
        }
    }
    items
}
