use std::ops::RangeInclusive;

use futures_util::future::join_all;

use harvester_core::{
    normalize, CategoryMap, HarvestReport, HarvestStatus, HarvestTarget, MovieRecord,
    ProgressSink,
};

use crate::transport::{CatalogTransport, TransportError};

/// Drives one harvest: resolves categories, schedules page batches and owns
/// the only mutable accumulator.
///
/// Batches run sequentially; within a batch every page is dispatched at
/// once and the transport's permit pool bounds what is actually in flight.
pub struct Harvester<T: CatalogTransport> {
    transport: T,
    target: HarvestTarget,
}

impl<T: CatalogTransport> Harvester<T> {
    pub fn new(transport: T, target: HarvestTarget) -> Self {
        Self { transport, target }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs the harvest to a terminal status.
    ///
    /// Never returns an error: every failure mode folds into the report.
    /// The only hard failures are credential rejection and an unresolvable
    /// category list; everything else degrades to a smaller-than-requested
    /// result carried in `skipped`.
    pub async fn run(&self, sink: &dyn ProgressSink) -> HarvestReport {
        let target_count = self.target.target_count();

        let categories = match self.transport.fetch_categories().await {
            Ok(map) => map,
            Err(err) => {
                log::error!("harvest aborted: {err}");
                return HarvestReport::errored(target_count, err.to_string());
            }
        };
        log::info!("resolved {} categories", categories.len());

        let mut records: Vec<MovieRecord> = Vec::new();
        for pages in self.target.batch_ranges() {
            if records.len() >= target_count {
                break;
            }
            // Cooperative cancellation: polled between batches only, so a
            // batch already in flight finishes and keeps its records.
            if sink.should_cancel() {
                log::info!("cancellation observed before pages {pages:?}");
                let skipped = target_count.saturating_sub(records.len());
                return HarvestReport {
                    records,
                    skipped,
                    status: HarvestStatus::Cancelled,
                };
            }

            match self.run_batch(pages.clone(), &categories, records.len()).await {
                Ok(batch) => {
                    let delta = batch.len();
                    records.extend(batch);
                    sink.on_progress(delta);
                }
                Err(TransportError::InvalidCredentials(reason)) => {
                    log::error!("aborting harvest: {reason}");
                    return HarvestReport::errored(target_count, reason);
                }
                Err(err) => {
                    // One bad batch must not abort the harvest.
                    log::warn!("batch {pages:?} failed: {err}; continuing");
                }
            }
        }

        records.truncate(target_count);
        let skipped = target_count.saturating_sub(records.len());
        if skipped > 0 {
            log::info!(
                "page space exhausted with {} of {target_count} records",
                records.len()
            );
        }
        HarvestReport {
            records,
            skipped,
            status: HarvestStatus::Completed,
        }
    }

    /// Fetches every page in the inclusive range concurrently, awaits the
    /// whole set, then normalizes entries while the running total stays
    /// below target. The check is against `accumulated` plus what this
    /// batch has produced so far, so a well-filled batch cannot overshoot.
    async fn run_batch(
        &self,
        pages: RangeInclusive<u32>,
        categories: &CategoryMap,
        accumulated: usize,
    ) -> Result<Vec<MovieRecord>, TransportError> {
        let outcomes = join_all(pages.map(|page| self.transport.fetch_page(page))).await;

        let target_count = self.target.target_count();
        let include_adult = self.target.include_adult();
        let mut batch = Vec::new();
        for outcome in outcomes {
            if accumulated + batch.len() >= target_count {
                break;
            }
            match outcome {
                Ok(Some(entries)) => {
                    for raw in &entries {
                        if accumulated + batch.len() >= target_count {
                            break;
                        }
                        batch.push(normalize(raw, categories, include_adult));
                    }
                }
                // Drained page: another page in this batch may still have
                // data, and the global stop belongs to the harvester.
                Ok(None) => {}
                Err(err @ TransportError::InvalidCredentials(_)) => return Err(err),
                Err(err) => {
                    log::warn!("dropping page result: {err}");
                }
            }
        }
        Ok(batch)
    }
}
