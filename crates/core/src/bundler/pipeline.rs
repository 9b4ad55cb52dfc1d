//! Default fetch-and-archive strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::error::{ArchiveError, BundleFailure};
use super::naming::{entry_base_name, EntryNamer};
use super::traits::{ArchiveStore, ArchiveWriter, BundleReport, Bundler, Fetcher};
use crate::metrics::FETCHES;

/// Fetches URLs one at a time, in order, and writes each success as an
/// archive entry.
pub struct FetchAndArchive<F: Fetcher, S: ArchiveStore> {
    fetcher: Arc<F>,
    store: Arc<S>,
}

impl<F: Fetcher, S: ArchiveStore> FetchAndArchive<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(store),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Run blocking archive I/O off the async executor.
async fn run_blocking<T, Op>(op: Op) -> Result<T, ArchiveError>
where
    Op: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| ArchiveError::WorkerPanicked(e.to_string()))
}

#[async_trait]
impl<F, S> Bundler for FetchAndArchive<F, S>
where
    F: Fetcher + 'static,
    S: ArchiveStore + 'static,
{
    fn name(&self) -> &str {
        "fetch_and_archive"
    }

    async fn bundle(&self, task_id: &str, urls: &[String]) -> Result<BundleReport, BundleFailure> {
        let store = Arc::clone(&self.store);
        let id = task_id.to_string();
        let mut writer: Box<dyn ArchiveWriter> = run_blocking(move || store.create(&id))
            .await
            .and_then(|created| created)
            .map_err(|e| {
                error!(task_id, error = %e, "Failed to create archive");
                BundleFailure::new(e, urls.to_vec())
            })?;

        let mut namer = EntryNamer::new();
        let mut entries = Vec::with_capacity(urls.len());
        let mut bad_links = Vec::new();

        for (index, url) in urls.iter().enumerate() {
            let content = match self.fetcher.fetch(url).await {
                Ok(content) => {
                    FETCHES.with_label_values(&["success"]).inc();
                    content
                }
                Err(e) => {
                    FETCHES.with_label_values(&["failed"]).inc();
                    warn!(task_id, url = %url, error = %e, "Failed to fetch file");
                    bad_links.push(url.clone());
                    continue;
                }
            };

            let name = namer.assign(&entry_base_name(url));
            let entry = name.clone();
            let written = run_blocking(move || {
                let result = writer.add_entry(&entry, &content);
                (writer, result)
            })
            .await;

            let result = match written {
                Ok((returned, result)) => {
                    writer = returned;
                    result
                }
                Err(e) => {
                    // The writer went down with the blocking task
                    error!(task_id, error = %e, "Archive writer lost");
                    bad_links.extend(urls[index..].iter().cloned());
                    return Err(BundleFailure::new(e, bad_links));
                }
            };

            match result {
                Ok(()) => entries.push(name),
                Err(e) => {
                    warn!(task_id, url = %url, error = %e, "Failed to write archive entry");
                    bad_links.push(url.clone());
                }
            }
        }

        let archive_location = match run_blocking(move || writer.finish())
            .await
            .and_then(|finished| finished)
        {
            Ok(location) => location,
            Err(e) => {
                error!(task_id, error = %e, "Failed to finalize archive");
                return Err(BundleFailure::new(e, bad_links));
            }
        };

        info!(
            task_id,
            entries = entries.len(),
            bad_links = bad_links.len(),
            location = %archive_location,
            "Archive written"
        );

        Ok(BundleReport {
            archive_location,
            entries,
            bad_links,
        })
    }
}
