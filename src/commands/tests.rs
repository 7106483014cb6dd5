use super::*;
use serde_json::json;

#[test]
fn plain_text_is_a_chat_message() {
    assert_eq!(
        process_input("Check my data"),
        CommandResult::ProcessAsMessage("Check my data".to_string())
    );
    // A lone slash is not a command
    assert_eq!(
        process_input("/"),
        CommandResult::ProcessAsMessage("/".to_string())
    );
}

#[test]
fn commands_are_case_insensitive() {
    assert_eq!(process_input("/TOOLS"), CommandResult::ListTools);
    assert_eq!(process_input("  /quit  "), CommandResult::Quit);
}

#[test]
fn upload_requires_a_path() {
    assert_eq!(
        process_input("/upload data/campaigns.csv"),
        CommandResult::Upload("data/campaigns.csv".to_string())
    );
    assert!(matches!(process_input("/upload"), CommandResult::Notice(_)));
}

#[test]
fn tool_parses_name_and_json_params() {
    let expected = json!({"column": "spend", "threshold": 3})
        .as_object()
        .cloned()
        .unwrap();
    assert_eq!(
        process_input(r#"/tool detect_anomalies {"column": "spend", "threshold": 3}"#),
        CommandResult::RunTool {
            name: "detect_anomalies".to_string(),
            params: expected,
        }
    );
    assert_eq!(
        process_input("/tool validate_data"),
        CommandResult::RunTool {
            name: "validate_data".to_string(),
            params: Map::new(),
        }
    );
}

#[test]
fn tool_rejects_bad_params() {
    match process_input("/tool fix_data [1, 2]") {
        CommandResult::Notice(text) => assert!(text.contains("JSON object")),
        other => panic!("unexpected {other:?}"),
    }
    match process_input("/tool fix_data {oops") {
        CommandResult::Notice(text) => assert!(text.starts_with("Invalid tool parameters")),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(process_input("/tool"), CommandResult::Notice(_)));
}

#[test]
fn action_passes_the_id_through() {
    assert_eq!(
        process_input("/action get_insights"),
        CommandResult::QuickAction("get_insights".to_string())
    );
}

#[test]
fn actions_lists_every_quick_action() {
    let CommandResult::Notice(text) = process_input("/actions") else {
        panic!("expected a notice");
    };
    for action in QuickActionDispatcher::new().actions() {
        assert!(text.contains(action.id));
        assert!(text.contains(action.prompt));
    }
}

#[test]
fn dump_accepts_an_optional_filename() {
    assert_eq!(process_input("/dump"), CommandResult::Dump(None));
    assert_eq!(
        process_input("/dump out.txt"),
        CommandResult::Dump(Some("out.txt".to_string()))
    );
    assert!(matches!(
        process_input("/dump a b"),
        CommandResult::Notice(_)
    ));
}

#[test]
fn unknown_commands_suggest_prefix_matches() {
    match process_input("/to") {
        CommandResult::Notice(text) => {
            assert!(text.contains("/tools"));
            assert!(text.contains("/tool"));
        }
        other => panic!("unexpected {other:?}"),
    }
    match process_input("/bogus") {
        CommandResult::Notice(text) => assert!(text.contains("/help")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn help_mentions_every_command() {
    let help = help_text();
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.usage);
    }
}

#[test]
fn registry_names_are_unique() {
    let mut names: Vec<_> = all_commands().iter().map(|c| c.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), all_commands().len());
}
