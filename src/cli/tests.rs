use super::*;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse_args(&["dqchat"]);
    assert!(args.command.is_none());
    assert!(!args.verbose);
}

#[test]
fn global_flags_parse_after_the_subcommand() {
    let args = parse_args(&[
        "dqchat",
        "chat",
        "--base-url",
        "http://agent:9000",
        "-d",
        "campaigns.csv",
        "-v",
    ]);
    assert!(matches!(args.command, Some(Commands::Chat)));
    assert_eq!(args.base_url.as_deref(), Some("http://agent:9000"));
    assert_eq!(args.data.as_deref(), Some("campaigns.csv"));
    assert!(args.verbose);
}

#[test]
fn say_joins_words_and_keeps_hyphens() {
    let args = parse_args(&["dqchat", "say", "is", "-1", "a", "valid", "spend?"]);
    match args.command {
        Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "is -1 a valid spend?"),
        _ => panic!("expected say"),
    }
}

#[test]
fn say_requires_a_prompt() {
    assert!(Args::try_parse_from(["dqchat", "say"]).is_err());
}

#[test]
fn tool_takes_name_and_optional_params() {
    let args = parse_args(&[
        "dqchat",
        "tool",
        "detect_anomalies",
        "--params",
        r#"{"column":"spend"}"#,
    ]);
    match args.command {
        Some(Commands::Tool { name, params }) => {
            assert_eq!(name, "detect_anomalies");
            assert_eq!(params.as_deref(), Some(r#"{"column":"spend"}"#));
        }
        _ => panic!("expected tool"),
    }

    match parse_args(&["dqchat", "tool", "validate_data"]).command {
        Some(Commands::Tool { params, .. }) => assert!(params.is_none()),
        _ => panic!("expected tool"),
    }
}

#[test]
fn set_without_key_shows_config() {
    match parse_args(&["dqchat", "set"]).command {
        Some(Commands::Set { key, value }) => {
            assert!(key.is_none());
            assert!(value.is_none());
        }
        _ => panic!("expected set"),
    }
    match parse_args(&["dqchat", "set", "data-path", "data/q3", "campaigns.csv"]).command {
        Some(Commands::Set { key, value }) => {
            assert_eq!(key.as_deref(), Some("data-path"));
            assert_eq!(value.unwrap().join(" "), "data/q3 campaigns.csv");
        }
        _ => panic!("expected set"),
    }
}

#[test]
fn log_file_flag_is_a_path() {
    let args = parse_args(&["dqchat", "health", "--log-file", "/tmp/dqchat.log"]);
    assert!(matches!(args.command, Some(Commands::Health)));
    assert_eq!(
        args.log_file.as_deref(),
        Some(Path::new("/tmp/dqchat.log"))
    );
}

