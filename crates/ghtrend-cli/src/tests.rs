use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["ghtrend-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn collect_defaults_to_a_single_run() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "collect"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Collect { watch: false })
    ));
}

#[test]
fn parses_collect_watch() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "collect", "--watch"])
        .expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Collect { watch: true })));
}

#[test]
fn parses_trending_daily_without_limit() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "trending", "daily"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Trending {
            view: TrendingView::Daily,
            limit: None
        })
    ));
}

#[test]
fn parses_trending_weekly_with_limit() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "trending", "weekly", "--limit", "25"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Trending {
            view: TrendingView::Weekly,
            limit: Some(25)
        })
    ));
}

#[test]
fn trending_rejects_unknown_view() {
    let result = Cli::try_parse_from(["ghtrend-cli", "trending", "monthly"]);
    assert!(result.is_err());
}

#[test]
fn parses_repo_id() {
    let cli =
        Cli::try_parse_from(["ghtrend-cli", "repo", "10270250"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Repo { id: 10_270_250 })));
}

#[test]
fn repo_requires_numeric_id() {
    let result = Cli::try_parse_from(["ghtrend-cli", "repo", "facebook/react"]);
    assert!(result.is_err());
}

#[test]
fn runs_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["ghtrend-cli", "runs"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 20 })));
}

#[test]
fn truncate_keeps_short_text_and_clips_long_text() {
    assert_eq!(query::truncate("short", 10), "short");
    assert_eq!(query::truncate("abcdefghij", 4), "abcd...");
    // Counts characters, not bytes.
    assert_eq!(query::truncate("ééééé", 5), "ééééé");
}

#[test]
fn error_cell_uses_ascii_placeholder_when_run_has_no_error() {
    assert_eq!(query::error_cell(None), "-");
    assert_eq!(query::error_cell(Some("rate limited")), "rate limited");
}
