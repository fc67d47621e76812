use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["revloc-cli", "db", "ping"]).expect("expected valid cli args");

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
        Cli::try_parse_from(["revloc-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["revloc-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_import_path() {
    let cli = Cli::try_parse_from(["revloc-cli", "import", "data/resellers.csv"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Import { ref path }) if path.ends_with("resellers.csv")
    ));
}

#[test]
fn import_requires_a_path() {
    assert!(Cli::try_parse_from(["revloc-cli", "import"]).is_err());
}

#[test]
fn enrich_defaults_to_plain_live_pass() {
    let cli = Cli::try_parse_from(["revloc-cli", "enrich"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Enrich {
            smart: false,
            dry_run: false
        })
    ));
}

#[test]
fn enrich_accepts_smart_and_dry_run_flags() {
    let cli = Cli::try_parse_from(["revloc-cli", "enrich", "--smart", "--dry-run"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Enrich {
            smart: true,
            dry_run: true
        })
    ));
}

#[test]
fn reset_enrichment_takes_optional_cnpj() {
    let all = Cli::try_parse_from(["revloc-cli", "reset-enrichment"])
        .expect("expected valid cli args");
    assert!(matches!(
        all.command,
        Some(Commands::ResetEnrichment { cnpj: None })
    ));

    let one = Cli::try_parse_from([
        "revloc-cli",
        "reset-enrichment",
        "--cnpj",
        "12.345.678/0001-95",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        one.command,
        Some(Commands::ResetEnrichment { cnpj: Some(ref c) }) if c == "12.345.678/0001-95"
    ));
}

#[test]
fn parses_search_with_overrides() {
    let cli = Cli::try_parse_from([
        "revloc-cli",
        "search",
        "01310-100",
        "--max-distance-km",
        "25.5",
        "--limit",
        "3",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            cep,
            max_distance_km,
            limit,
        }) => {
            assert_eq!(cep, "01310-100");
            assert_eq!(max_distance_km, Some(25.5));
            assert_eq!(limit, Some(3));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn search_rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["revloc-cli", "search", "01310-100", "--limit", "many"]).is_err());
}

#[test]
fn parses_lookup_and_geocode() {
    let lookup = Cli::try_parse_from(["revloc-cli", "lookup", "12345678000195"])
        .expect("expected valid cli args");
    assert!(matches!(
        lookup.command,
        Some(Commands::Lookup { ref cnpj }) if cnpj == "12345678000195"
    ));

    let geocode = Cli::try_parse_from([
        "revloc-cli",
        "geocode",
        "Avenida Paulista, 1000",
        "--city",
        "São Paulo",
        "--state",
        "SP",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        geocode.command,
        Some(Commands::Geocode {
            ref address,
            city: Some(_),
            state: Some(ref s),
        }) if address == "Avenida Paulista, 1000" && s == "SP"
    ));
}

#[test]
fn parses_stats_command() {
    let cli = Cli::try_parse_from(["revloc-cli", "stats"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Stats)));
}

#[test]
fn truncate_shortens_long_names_on_char_boundaries() {
    assert_eq!(data::truncate("Loja", 10), "Loja");
    assert_eq!(data::truncate("Distribuidora São João", 10), "Distrib...");
}
