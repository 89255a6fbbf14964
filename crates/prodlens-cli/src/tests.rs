use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["prodlens"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.compact);
}

#[test]
fn parses_scrape_command() {
    let cli = Cli::try_parse_from(["prodlens", "scrape", "https://www.amazon.com/dp/B0"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Scrape { ref url, html_file: None }) if url == "https://www.amazon.com/dp/B0"
    ));
}

#[test]
fn parses_scrape_from_saved_file() {
    let cli = Cli::try_parse_from([
        "prodlens",
        "scrape",
        "https://www.ebay.com/itm/123456789012",
        "--html-file",
        "page.html",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Scrape { html_file, .. }) => {
            assert_eq!(html_file, Some(PathBuf::from("page.html")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_compare_with_global_flag() {
    let cli = Cli::try_parse_from([
        "prodlens",
        "compare",
        "https://www.walmart.com/ip/1",
        "--no-summary",
        "--compact",
    ])
    .expect("expected valid cli args");
    assert!(cli.compact);
    assert!(matches!(
        cli.command,
        Some(Commands::Compare {
            no_summary: true,
            ..
        })
    ));
}

#[test]
fn parses_ask_command() {
    let cli = Cli::try_parse_from([
        "prodlens",
        "ask",
        "https://www.amazon.com/dp/B0",
        "Is it cordless?",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Ask { ref question, .. }) if question == "Is it cordless?"
    ));
}

#[test]
fn ask_requires_question() {
    assert!(Cli::try_parse_from(["prodlens", "ask", "https://www.amazon.com/dp/B0"]).is_err());
}
