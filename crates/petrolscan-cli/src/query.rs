//! Read-only listing commands.

use chrono::{DateTime, Utc};
use petrolscan_core::{FuelQuality, Station};

fn fmt_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Print the most recent crawl runs with their ingest counters.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs(
    pool: &sqlx::PgPool,
    station: Option<Station>,
    limit: i64,
) -> anyhow::Result<()> {
    let runs = petrolscan_db::list_crawl_runs(pool, station.map(Station::as_str), limit).await?;

    if runs.is_empty() {
        println!("no crawl runs found; run `crawl` first");
        return Ok(());
    }

    println!(
        "{:<8}{:<10}{:<11}{:>5}{:>5}{:>6}{:>5}{:>5}  {:<21}{:<21}ERROR",
        "ID", "STATION", "STATUS", "INS", "UPD", "SKIP", "FAIL", "DROP", "STARTED", "FINISHED"
    );
    for run in &runs {
        let c = &run.counts;
        println!(
            "{:<8}{:<10}{:<11}{:>5}{:>5}{:>6}{:>5}{:>5}  {:<21}{:<21}{}",
            run.id,
            run.station,
            run.status,
            c.inserted,
            c.updated,
            c.skipped,
            c.failed,
            c.dropped,
            fmt_time(Some(run.started_at)),
            fmt_time(run.finished_at),
            run.error_message
                .as_deref()
                .map(|m| truncate(m, 40))
                .unwrap_or_default()
        );
    }

    Ok(())
}

/// Print stored fuel prices, optionally for a single outlet.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored row is
/// malformed.
pub(crate) async fn run_prices(
    pool: &sqlx::PgPool,
    station_name: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let records = petrolscan_db::list_fuel_price_records(pool, station_name, limit).await?;

    if records.is_empty() {
        println!(
            "no fuel prices found{}",
            station_name
                .map(|s| format!(" for {s}"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    println!(
        "{:<28}{:<22}{:<20}{:<20}{:<10}{:>8}  UPDATED",
        "STATION", "LOCATION", "FUEL", "TYPE", "QUALITY", "PRICE"
    );
    for record in &records {
        println!(
            "{:<28}{:<22}{:<20}{:<20}{:<10}{:>8.2}  {}",
            truncate(&record.station_name, 25),
            truncate(&record.location_name, 19),
            truncate(&record.fuel_name, 17),
            record.fuel_type.as_str(),
            record.fuel_quality.map_or("-", FuelQuality::as_str),
            record.price,
            fmt_time(Some(record.timestamp))
        );
    }

    Ok(())
}
