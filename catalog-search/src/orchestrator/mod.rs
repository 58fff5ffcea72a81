//! Orchestrator module for the catalog search service.
//!
//! Keeps the search index in step with the primary store: loads the full
//! product, maps it and writes it for every lifecycle event, and rebuilds the
//! whole index on demand.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use catalog_search_repository::{RebuildReport, SearchIndexService};
use catalog_search_shared::ProductEvent;
use catalog_store_repository::{PopulateProfile, PrimaryStore};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SyncError;
use crate::notifier::FailureNotifier;
use crate::processor::ProductMapper;

/// Result of syncing one product.
///
/// Syncs never fail towards their caller; a failure is reported here after
/// it has been logged and notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The full document was written.
    Indexed,
    /// The document was removed, or was already absent.
    Removed,
    /// The product no longer exists in the primary store; nothing written.
    NotFound,
    /// The sync failed with this message.
    Failed(String),
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed(_))
    }
}

pub struct SyncOrchestrator {
    store: Arc<dyn PrimaryStore>,
    index: Arc<SearchIndexService>,
    mapper: ProductMapper,
    notifier: Arc<dyn FailureNotifier>,
    /// Total number of events handled since startup.
    total_events_processed: AtomicU64,
    /// Total number of syncs that ended in `SyncOutcome::Failed`.
    total_failures: AtomicU64,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn PrimaryStore>,
        index: Arc<SearchIndexService>,
        notifier: Arc<dyn FailureNotifier>,
    ) -> Self {
        Self {
            store,
            index,
            mapper: ProductMapper::new(),
            notifier,
            total_events_processed: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
        }
    }

    /// Load, map and upsert one product.
    #[instrument(skip(self))]
    pub async fn index_one(&self, product_id: i64) -> SyncOutcome {
        let product = match self
            .store
            .find_product_by_id(product_id, PopulateProfile::ProductFull)
            .await
        {
            Ok(Some(product)) => product,
            Ok(None) => {
                debug!(product_id = product_id, "Product not found in primary store, nothing to index");
                return SyncOutcome::NotFound;
            }
            Err(e) => return self.report_failure(product_id, "", SyncError::from(e)).await,
        };

        let document = self.mapper.map(&product);
        match self.index.upsert(&document).await {
            Ok(()) => {
                debug!(product_id = product_id, "Product indexed");
                SyncOutcome::Indexed
            }
            Err(e) => {
                self.report_failure(product_id, product.display_title(), SyncError::from(e))
                    .await
            }
        }
    }

    /// Remove one product's document. An absent document counts as removed.
    #[instrument(skip(self))]
    pub async fn remove_one(&self, product_id: i64) -> SyncOutcome {
        match self.index.remove(product_id).await {
            Ok(()) => {
                debug!(product_id = product_id, "Product removed from index");
                SyncOutcome::Removed
            }
            Err(e) => self.report_failure(product_id, "", SyncError::from(e)).await,
        }
    }

    pub async fn handle_event(&self, event: ProductEvent) -> SyncOutcome {
        self.total_events_processed.fetch_add(1, Ordering::Relaxed);

        match event {
            ProductEvent::Created { product_id } | ProductEvent::Updated { product_id } => {
                self.index_one(product_id).await
            }
            ProductEvent::Deleted { product_id } => self.remove_one(product_id).await,
        }
    }

    /// Rebuild the whole index from the primary store.
    ///
    /// Assumes it owns the index for its duration and must not run
    /// concurrently with itself. Per-document failures are logged and
    /// reported in the returned summary; only failures that stop the job
    /// as a whole are returned as errors.
    #[instrument(skip(self))]
    pub async fn reindex_all(&self) -> Result<RebuildReport, SyncError> {
        info!("Loading full catalog for reindex");
        let products = self
            .store
            .find_all_products(PopulateProfile::ProductFull)
            .await?;

        let documents = self.mapper.map_batch(&products);
        let report = self.index.rebuild(&documents).await?;

        if report.summary.failed > 0 {
            warn!(
                failed = report.summary.failed,
                failed_ids = ?report.summary.failed_ids(),
                "Reindex finished with failed documents"
            );
        }
        Ok(report)
    }

    /// Consume product events until the channel closes or Ctrl-C.
    ///
    /// Events are handled one at a time in arrival order.
    #[instrument(skip(self, events))]
    pub async fn run(&self, events: mpsc::Receiver<ProductEvent>) {
        self.run_until(events, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
    }

    /// Consume product events until the channel closes or `shutdown`
    /// completes.
    ///
    /// On shutdown the channel is closed to new events and everything
    /// already queued is still applied, since those events were
    /// acknowledged to their senders.
    pub async fn run_until<F>(&self, mut events: mpsc::Receiver<ProductEvent>, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!("Ready to process product events");

        let mut progress_timer = interval(Duration::from_secs(60));
        progress_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut reported_events = 0;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            self.handle_event(event).await;
                        }
                        None => {
                            info!("Product event channel closed");
                            break;
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Received shutdown signal, draining queued events");
                    events.close();
                    let mut drained = 0;
                    while let Some(event) = events.recv().await {
                        self.handle_event(event).await;
                        drained += 1;
                    }
                    info!(drained = drained, "Queued events drained");
                    break;
                }
                _ = progress_timer.tick() => {
                    let processed = self.total_events_processed.load(Ordering::Relaxed);
                    if processed != reported_events {
                        info!(
                            events_processed = processed,
                            failures = self.total_failures.load(Ordering::Relaxed),
                            "Processing progress"
                        );
                        reported_events = processed;
                    }
                }
            }
        }

        info!(
            total_events_processed = self.total_events_processed.load(Ordering::Relaxed),
            total_failures = self.total_failures.load(Ordering::Relaxed),
            "Orchestrator shutdown complete"
        );
    }

    /// Log a failed sync and tell the notifier. Notifier errors are logged
    /// and dropped.
    async fn report_failure(&self, product_id: i64, title: &str, err: SyncError) -> SyncOutcome {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        let message = err.to_string();

        error!(
            product_id = product_id,
            title = %title,
            error = %message,
            "Failed to sync product to search index"
        );

        if let Err(e) = self
            .notifier
            .notify_sync_failure(product_id, title, &message)
            .await
        {
            warn!(product_id = product_id, error = %e, "Failed to send sync failure notification");
        }

        SyncOutcome::Failed(message)
    }
}
