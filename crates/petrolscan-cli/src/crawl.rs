//! `crawl` command: one worker task per station, supervised from `main`.
//!
//! Each worker reads its station's dataset and drives an ingest pipeline over
//! it. Station failures are logged and reported rather than propagated, so a
//! single broken dataset does not abort the whole run. Ctrl-C asks workers to
//! stop after the observation they are currently writing.

use std::sync::Arc;

use petrolscan_core::{AppConfig, FuelPriceStore, Station, StationConfig};
use petrolscan_db::{CrawlCounts, CrawlOutcome, PgFuelPriceStore};
use petrolscan_ingest::{
    DatasetFileSource, IngestSummary, MemoryStore, ObservationSource, Pipeline,
};
use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Result of one station worker.
pub(crate) struct StationReport {
    pub station: Station,
    pub summary: IngestSummary,
    pub outcome: CrawlOutcome,
}

/// Counters stored on a crawl run. Values beyond `i32::MAX` saturate.
pub(crate) fn run_counts(summary: &IngestSummary) -> CrawlCounts {
    let clamp = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
    CrawlCounts {
        inserted: clamp(summary.inserted),
        updated: clamp(summary.updated),
        skipped: clamp(summary.skipped),
        failed: clamp(summary.failed),
        dropped: clamp(summary.dropped),
    }
}

/// Resolve which stations a crawl should process.
///
/// An explicitly requested station must exist in the registry and be
/// enabled.
pub(crate) fn select_stations(
    registry: &petrolscan_core::StationsFile,
    station_filter: Option<Station>,
) -> anyhow::Result<Vec<StationConfig>> {
    if let Some(station) = station_filter {
        let entry = registry
            .get(station)
            .ok_or_else(|| anyhow::anyhow!("station '{station}' is not in the station registry"))?;
        if !entry.enabled {
            anyhow::bail!("station '{station}' is disabled in the station registry");
        }
    }

    let selected: Vec<StationConfig> = registry
        .enabled(station_filter)
        .into_iter()
        .cloned()
        .collect();
    if selected.is_empty() {
        anyhow::bail!("no enabled stations to crawl");
    }
    Ok(selected)
}

/// Run every selected station worker to completion.
///
/// With `pool == None` this is a dry run: records go to a shared in-memory
/// store and no crawl runs are recorded.
///
/// # Errors
///
/// Returns an error if the station registry cannot be loaded or if every
/// station failed.
pub(crate) async fn run_crawl(
    config: &AppConfig,
    pool: Option<PgPool>,
    station_filter: Option<Station>,
) -> anyhow::Result<()> {
    let registry = petrolscan_core::load_stations(&config.stations_path)?;
    let stations = select_stations(&registry, station_filter)?;

    let reports = match pool {
        Some(pool) => {
            let store = PgFuelPriceStore::new(pool.clone());
            supervise(config, &stations, store, Some(pool)).await
        }
        None => {
            let store = Arc::new(MemoryStore::new());
            let reports = supervise(config, &stations, Arc::clone(&store), None).await;
            println!("dry-run: in-memory store holds {} record(s)", store.len());
            reports
        }
    };

    print_reports(&reports);

    let failed = reports
        .iter()
        .filter(|r| matches!(r.outcome, CrawlOutcome::Failed(_)))
        .count();
    if failed > 0 && failed == stations.len() {
        anyhow::bail!("all {failed} stations failed");
    }
    Ok(())
}

async fn supervise<S>(
    config: &AppConfig,
    stations: &[StationConfig],
    store: S,
    runs: Option<PgPool>,
) -> Vec<StationReport>
where
    S: FuelPriceStore + Clone + 'static,
{
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let mut workers = JoinSet::new();

    for entry in stations {
        let station = entry.station;
        let span = tracing::info_span!("station", station = %station, name = %entry.name);
        let pipeline =
            Pipeline::new(store.clone(), span).skip_ungeocoded(config.skip_ungeocoded);
        let source = DatasetFileSource::in_dir(&config.dataset_dir, station);
        let runs = runs.clone();
        let cancel = cancel_rx.clone();

        workers.spawn(run_station(pipeline, source, runs, cancel));
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut cancelling = false;
    let mut reports = Vec::with_capacity(stations.len());

    loop {
        tokio::select! {
            () = &mut shutdown, if !cancelling => {
                tracing::warn!("cancellation requested, finishing in-flight observations");
                cancel_tx.send_replace(true);
                cancelling = true;
            }
            joined = workers.join_next() => match joined {
                Some(Ok(report)) => reports.push(report),
                Some(Err(err)) => tracing::error!(error = %err, "station worker aborted"),
                None => break,
            },
        }
    }

    reports.sort_by_key(|r| r.station);
    reports
}

/// Crawl one station, recording a crawl run when a pool is available.
async fn run_station<S: FuelPriceStore>(
    pipeline: Pipeline<S>,
    source: DatasetFileSource,
    runs: Option<PgPool>,
    cancel: watch::Receiver<bool>,
) -> StationReport {
    let station = source.station();

    let run_id = match &runs {
        Some(pool) => {
            let dataset_path = source.path().display().to_string();
            match petrolscan_db::begin_crawl_run(pool, station.as_str(), &dataset_path).await {
                Ok(run) => Some(run.id),
                Err(err) => {
                    tracing::error!(station = %station, error = %err, "failed to record crawl run");
                    return StationReport {
                        station,
                        summary: IngestSummary::default(),
                        outcome: CrawlOutcome::Failed(format!("{err:#}")),
                    };
                }
            }
        }
        None => None,
    };

    let (summary, outcome) = crawl_station(&pipeline, &source, cancel).await;

    if let (Some(pool), Some(id)) = (&runs, run_id) {
        finish_run(pool, id, &summary, &outcome).await;
    }

    StationReport {
        station,
        summary,
        outcome,
    }
}

async fn crawl_station<S: FuelPriceStore>(
    pipeline: &Pipeline<S>,
    source: &DatasetFileSource,
    mut cancel: watch::Receiver<bool>,
) -> (IngestSummary, CrawlOutcome) {
    let mut summary = IngestSummary::default();

    let fetched = tokio::select! {
        fetched = source.fetch_observations() => fetched,
        Ok(()) = cancel.changed() => return (summary, CrawlOutcome::Cancelled),
    };
    let observations = match fetched {
        Ok(observations) => observations,
        Err(err) => {
            tracing::error!(station = %source.station(), error = %err, "failed to load dataset");
            return (summary, CrawlOutcome::Failed(err.to_string()));
        }
    };

    for observation in observations {
        let cancelled = *cancel.borrow();
        if cancelled {
            return (summary, CrawlOutcome::Cancelled);
        }
        pipeline.submit(observation, &mut summary).await;
    }

    (summary, CrawlOutcome::Succeeded)
}

async fn finish_run(pool: &PgPool, run_id: i64, summary: &IngestSummary, outcome: &CrawlOutcome) {
    let counts = run_counts(summary);
    if let Err(err) = petrolscan_db::finish_crawl_run(pool, run_id, outcome, counts).await {
        tracing::error!(
            run_id,
            status = outcome.status(),
            error = %err,
            "failed to close crawl run"
        );
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn print_reports(reports: &[StationReport]) {
    println!(
        "{:<10}{:>9}{:>9}{:>9}{:>8}{:>9}  STATUS",
        "STATION", "INSERTED", "UPDATED", "SKIPPED", "FAILED", "DROPPED"
    );
    for report in reports {
        let s = &report.summary;
        let status = match &report.outcome {
            CrawlOutcome::Failed(message) => format!("failed: {message}"),
            other => other.status().to_string(),
        };
        println!(
            "{:<10}{:>9}{:>9}{:>9}{:>8}{:>9}  {status}",
            report.station.as_str(),
            s.inserted,
            s.updated,
            s.skipped,
            s.failed,
            s.dropped
        );
    }
}
