//! The classify → decide → write pipeline run by each station worker.

use petrolscan_classify::classify_observation;
use petrolscan_core::{FuelPriceStore, Observation};
use tracing::{Instrument, Span};

use crate::detect::decide;
use crate::error::IngestError;
use crate::writer::{apply, WriteResult};

/// Per-run counters returned by [`Pipeline::ingest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Observations dropped for lacking coordinates.
    pub dropped: usize,
}

impl IngestSummary {
    /// Records written (inserted or updated).
    #[must_use]
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }

    /// Observations that reached the store without error.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.written() + self.skipped
    }

    fn record(&mut self, result: &WriteResult) {
        match result {
            WriteResult::Inserted(_) => self.inserted += 1,
            WriteResult::Updated(_) => self.updated += 1,
            WriteResult::Unchanged => self.skipped += 1,
        }
    }
}

/// Sequential ingest pipeline over one store.
///
/// Events are emitted inside the span supplied at construction, so a worker
/// can attach its station and run id once.
pub struct Pipeline<S> {
    store: S,
    span: Span,
    skip_ungeocoded: bool,
}

impl<S: FuelPriceStore> Pipeline<S> {
    #[must_use]
    pub fn new(store: S, span: Span) -> Self {
        Self {
            store,
            span,
            skip_ungeocoded: false,
        }
    }

    /// Drop observations whose outlet has the `(0, 0)` sentinel coordinates
    /// instead of storing them.
    #[must_use]
    pub fn skip_ungeocoded(mut self, skip: bool) -> Self {
        self.skip_ungeocoded = skip;
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Classifies one observation, decides against the store and writes.
    ///
    /// # Errors
    ///
    /// Returns the [`IngestError`] of whichever step failed. Nothing is
    /// written when the lookup fails.
    pub async fn process(&self, observation: Observation) -> Result<WriteResult, IngestError> {
        let classified = classify_observation(observation);
        let obs = &classified.observation;

        async {
            tracing::debug!(
                station = %obs.station,
                station_name = %obs.station_name,
                location = %obs.location.name,
                fuel_name = %obs.fuel_name,
                fuel_type = %classified.fuel_type,
                fuel_quality = ?classified.fuel_quality,
                price = obs.price,
                "classified observation"
            );

            let decision = decide(&self.store, &classified).await?;
            let result = apply(&self.store, decision, &classified).await?;

            match &result {
                WriteResult::Inserted(record) | WriteResult::Updated(record) => {
                    tracing::info!(
                        station_name = %record.station_name,
                        fuel_name = %record.fuel_name,
                        price = record.price,
                        decision = %decision,
                        record_id = record.id,
                        "stored fuel price"
                    );
                }
                WriteResult::Unchanged => {
                    tracing::debug!(
                        station_name = %obs.station_name,
                        fuel_name = %obs.fuel_name,
                        decision = %decision,
                        "price unchanged"
                    );
                }
            }

            Ok::<_, IngestError>(result)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Runs one observation through the pipeline and folds the outcome into
    /// `summary`. Failures are logged and counted, never propagated.
    pub async fn submit(&self, observation: Observation, summary: &mut IngestSummary) {
        if self.skip_ungeocoded && observation.location.is_ungeocoded() {
            tracing::info!(
                parent: &self.span,
                station_name = %observation.station_name,
                location = %observation.location.name,
                fuel_name = %observation.fuel_name,
                "dropping observation without coordinates"
            );
            summary.dropped += 1;
            return;
        }

        let station = observation.station;
        let station_name = observation.station_name.clone();
        let location = observation.location.name.clone();
        let fuel_name = observation.fuel_name.clone();

        match self.process(observation).await {
            Ok(result) => summary.record(&result),
            Err(err) => {
                tracing::error!(
                    parent: &self.span,
                    station = %station,
                    station_name = %station_name,
                    location = %location,
                    fuel_name = %fuel_name,
                    retryable = err.is_retryable(),
                    error = %err,
                    "failed to ingest observation"
                );
                summary.failed += 1;
            }
        }
    }

    /// Ingests a batch in order. One observation failing does not stop the
    /// rest.
    pub async fn ingest<I>(&self, observations: I) -> IngestSummary
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut summary = IngestSummary::default();
        for observation in observations {
            self.submit(observation, &mut summary).await;
        }

        tracing::info!(
            parent: &self.span,
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            dropped = summary.dropped,
            "ingest finished"
        );
        summary
    }
}
