//! The run driver: wires the queues, feeds names, writes the index and shuts
//! the pools down in dependency order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pkgmirror_fetch::HttpClient;

use crate::catalog::fetch_catalog;
use crate::error::{MirrorError, Result};
use crate::fetch::FileFetcher;
use crate::index::IndexWriter;
use crate::layout::MirrorLayout;
use crate::name::PackageName;
use crate::options::MirrorOptions;
use crate::pool::WorkerPool;
use crate::reconcile::Reconciler;

/// Summary of one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Index lines written by this run.
    pub packages_indexed: u64,
    /// Reconciler workers that exited normally.
    pub reconcilers:      usize,
    /// Fetcher workers that exited normally.
    pub fetchers:         usize,
    pub elapsed:          Duration,
}

pub struct Mirror<C> {
    client:  Arc<C>,
    options: Arc<MirrorOptions>,
    layout:  MirrorLayout,
}

impl<C: HttpClient + 'static> Mirror<C> {
    pub fn new(client: Arc<C>, options: MirrorOptions) -> Self {
        let layout = MirrorLayout::new(&options.root);
        Self {
            client,
            options: Arc::new(options),
            layout,
        }
    }

    pub fn layout(&self) -> &MirrorLayout { &self.layout }

    pub fn options(&self) -> &MirrorOptions { &self.options }

    /// List the catalog and mirror every package in it.
    ///
    /// A catalog failure aborts the run before any worker starts.
    pub async fn run_catalog(&self) -> Result<MirrorReport> {
        let names = fetch_catalog(
            self.client.as_ref(),
            &self.options.catalog_url,
            self.options.timeouts.catalog,
        )
        .await?;
        self.run(names).await
    }

    /// Mirror the given packages.
    ///
    /// Names sharing a lowercase form map to one directory, so only the first
    /// of them is reconciled.
    pub async fn run(&self, names: Vec<PackageName>) -> Result<MirrorReport> {
        let started = Instant::now();
        let names = unique_entries(names);
        self.layout.bootstrap()?;
        let mut index = IndexWriter::open(self.layout.index_path())?;

        let capacity = self.options.queue_capacity.max(1);
        let (package_tx, package_rx) = async_channel::bounded(capacity);
        let (file_tx, file_rx) = async_channel::bounded(capacity);
        let (result_tx, result_rx) = async_channel::bounded(capacity);

        let fetchers = WorkerPool::spawn("fetcher", self.options.fetchers, file_rx, |_, queue| {
            FileFetcher::new(self.client.clone(), &self.layout, &self.options).run(queue)
        });
        let reconcilers = WorkerPool::spawn("reconciler", self.options.reconcilers, package_rx, |_, queue| {
            Reconciler::new(
                self.client.clone(),
                self.layout.clone(),
                self.options.clone(),
                file_tx.clone(),
                result_tx.clone(),
            )
            .run(queue)
        });
        // Reconcilers now hold the only senders: the file and results queues
        // close once the last reconciler returns.
        drop(file_tx);
        drop(result_tx);

        tracing::info!(packages = names.len(), "packages queued");

        for name in names {
            let send = package_tx.send(name);
            tokio::pin!(send);
            loop {
                tokio::select! {
                    sent = &mut send => {
                        sent.map_err(|_| MirrorError::QueueClosed("package"))?;
                        break;
                    }
                    Ok(record) = result_rx.recv() => index.append(&record)?,
                }
            }
        }

        package_tx.close();
        while let Ok(record) = result_rx.recv().await {
            index.append(&record)?;
        }
        let reconcilers = reconcilers.join().await;
        let fetchers = fetchers.join().await;
        index.sync()?;

        let report = MirrorReport {
            packages_indexed: index.count(),
            reconcilers,
            fetchers,
            elapsed: started.elapsed(),
        };
        tracing::info!(packages = report.packages_indexed, "Packages found");
        tracing::info!(elapsed = ?report.elapsed, "Time elapsed");
        Ok(report)
    }
}

fn unique_entries(names: Vec<PackageName>) -> Vec<PackageName> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| {
            let fresh = seen.insert(name.normalized().to_string());
            if !fresh {
                tracing::warn!(package = %name, "duplicate of an earlier entry, skipping");
            }
            fresh
        })
        .collect()
}
