//! Standalone bulk resync job.
//!
//! Rebuilds the product index from the primary store once and exits. Must
//! not run concurrently with itself.

use catalog_search::{init_tracing, Dependencies, IndexingError, Settings};
use dotenv::dotenv;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    dotenv().ok();

    init_tracing("catalog-search-reindex");

    let settings = Settings::from_env()?;
    let deps = Dependencies::new(settings).await?;

    info!(mode = ?deps.settings.rebuild_mode, "Starting full reindex");

    match deps.orchestrator.reindex_all().await {
        Ok(report) => {
            if report.summary.failed > 0 {
                warn!(
                    index = %report.index,
                    succeeded = report.summary.succeeded,
                    failed = report.summary.failed,
                    "Reindex completed with failures"
                );
            } else {
                info!(
                    index = %report.index,
                    indexed = report.summary.succeeded,
                    batches = report.batches,
                    "Reindex completed"
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Reindex failed");
            Err(e.into())
        }
    }
}
