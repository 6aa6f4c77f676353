use super::*;

use petrolscan_core::parse_stations;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["petrolscan", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["petrolscan", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["petrolscan"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_classify_with_station_and_name() {
    let cli = Cli::try_parse_from([
        "petrolscan",
        "classify",
        "--station",
        "globus",
        "Natural 95 Plus",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Classify {
            station: Station::Globus,
            ref name
        }) if name == "Natural 95 Plus"
    ));
}

#[test]
fn classify_rejects_unknown_station() {
    let result = Cli::try_parse_from(["petrolscan", "classify", "--station", "benzina", "n95"]);
    assert!(result.is_err());
}

#[test]
fn crawl_defaults_to_all_stations_against_database() {
    let cli = Cli::try_parse_from(["petrolscan", "crawl"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl {
            station: None,
            dry_run: false
        })
    ));
}

#[test]
fn crawl_with_station_filter_and_dry_run() {
    let cli =
        Cli::try_parse_from(["petrolscan", "crawl", "--station", "ONO", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Crawl {
            station: Some(Station::Ono),
            dry_run: true
        })
    ));
}

#[test]
fn runs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["petrolscan", "runs"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Runs {
            station: None,
            limit: 20
        })
    ));
}

#[test]
fn runs_accepts_station_filter() {
    let cli = Cli::try_parse_from(["petrolscan", "runs", "--station", "orlen"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Runs {
            station: Some(Station::Orlen),
            ..
        })
    ));
}

#[test]
fn prices_accepts_outlet_filter() {
    let cli = Cli::try_parse_from([
        "petrolscan",
        "prices",
        "--station-name",
        "Globus Brno",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Prices {
            station_name: Some(ref s),
            limit: 5
        }) if s == "Globus Brno"
    ));
}

// -----------------------------------------------------------------------
// Classify
// -----------------------------------------------------------------------

#[test]
fn classify_line_is_tab_separated() {
    assert_eq!(
        classify_line(Station::Globus, "Diesel"),
        "globus\tDiesel\tDIESEL\tSTANDARD"
    );
}

#[test]
fn classify_line_marks_missing_quality_with_dash() {
    let line = classify_line(Station::Makro, "Mycí program");
    assert!(line.ends_with("\tUNCLASSIFIED\t-"), "got {line:?}");
}

#[tokio::test]
async fn classify_does_not_need_valid_configuration() {
    std::env::set_var("PETROLSCAN_ENV", "staging");
    assert!(petrolscan_core::load_app_config().is_err());

    let cli = Cli::try_parse_from(["petrolscan", "classify", "--station", "ono", "nmc"]).unwrap();
    let result = run(cli).await;

    std::env::remove_var("PETROLSCAN_ENV");
    assert!(result.is_ok(), "classify failed: {result:?}");
}

// -----------------------------------------------------------------------
// Crawl run counters
// -----------------------------------------------------------------------

#[test]
fn run_counts_copy_every_summary_counter() {
    let summary = petrolscan_ingest::IngestSummary {
        inserted: 4,
        updated: 3,
        skipped: 20,
        failed: 1,
        dropped: 2,
    };
    let counts = crawl::run_counts(&summary);
    assert_eq!(
        counts,
        petrolscan_db::CrawlCounts {
            inserted: 4,
            updated: 3,
            skipped: 20,
            failed: 1,
            dropped: 2,
        }
    );
}

#[test]
fn run_counts_saturate_instead_of_wrapping() {
    let summary = petrolscan_ingest::IngestSummary {
        inserted: usize::MAX,
        ..Default::default()
    };
    assert_eq!(crawl::run_counts(&summary).inserted, i32::MAX);
}

// -----------------------------------------------------------------------
// Station selection
// -----------------------------------------------------------------------

const REGISTRY: &str = "
stations:
  - station: globus
    name: Globus
    url: https://www.globus.cz/benzinove-stanice
  - station: ono
    name: ONO
    url: https://www.tank-ono.cz/cz/index.php?page=cenik
  - station: shell
    name: Shell
    url: https://www.shell.cz
    enabled: false
";

#[test]
fn select_stations_returns_all_enabled() {
    let registry = parse_stations(REGISTRY).unwrap();
    let selected = crawl::select_stations(&registry, None).unwrap();
    let ids: Vec<Station> = selected.iter().map(|s| s.station).collect();
    assert_eq!(ids, vec![Station::Globus, Station::Ono]);
}

#[test]
fn select_stations_narrows_to_filter() {
    let registry = parse_stations(REGISTRY).unwrap();
    let selected = crawl::select_stations(&registry, Some(Station::Ono)).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].station, Station::Ono);
}

#[test]
fn select_stations_rejects_disabled_station() {
    let registry = parse_stations(REGISTRY).unwrap();
    let err = crawl::select_stations(&registry, Some(Station::Shell)).unwrap_err();
    assert!(err.to_string().contains("disabled"));
}

#[test]
fn select_stations_rejects_unregistered_station() {
    let registry = parse_stations(REGISTRY).unwrap();
    let err = crawl::select_stations(&registry, Some(Station::Makro)).unwrap_err();
    assert!(err.to_string().contains("not in the station registry"));
}
