use super::data::{path_display, Config, ConfigKey, ResolvedConfig, DEFAULT_BASE_URL};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set(ConfigKey::BaseUrl, "http://agent.internal:9000")
        .unwrap();
    config.set(ConfigKey::DataPath, "campaigns.csv").unwrap();
    config.save_to_path(&config_path).expect("Failed to save config");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(loaded.base_url.as_deref(), Some("http://agent.internal:9000"));
    assert_eq!(loaded.data_path.as_deref(), Some("campaigns.csv"));
    assert_eq!(loaded.show_tool_results, None);

    let mut loaded = loaded;
    loaded.unset(ConfigKey::DataPath);
    loaded.set(ConfigKey::ShowToolResults, "off").unwrap();
    loaded.save_to_path(&config_path).expect("Failed to save config");

    let reloaded = Config::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(reloaded.data_path, None);
    assert_eq!(reloaded.show_tool_results, Some(false));
    assert!(!std::fs::read_to_string(&config_path)
        .unwrap()
        .contains("data_path"));
}

#[test]
fn test_invalid_toml_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "base_url = [unterminated").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn test_resolution_precedence() {
    let config = Config {
        base_url: Some("http://from-file:1".to_string()),
        data_path: Some("file.csv".to_string()),
        show_tool_results: Some(false),
    };

    let resolved = config.resolve(Some("http://from-flag:3"), None, Some("http://from-env:2"));
    assert_eq!(resolved.base_url, "http://from-flag:3");
    assert_eq!(resolved.data_path.as_deref(), Some("file.csv"));
    assert!(!resolved.show_tool_results);

    let resolved = config.resolve(None, Some("flag.csv"), Some("http://from-env:2"));
    assert_eq!(resolved.base_url, "http://from-env:2");
    assert_eq!(resolved.data_path.as_deref(), Some("flag.csv"));

    let resolved = config.resolve(None, None, Some("  "));
    assert_eq!(resolved.base_url, "http://from-file:1");
}

#[test]
fn test_defaults_when_nothing_is_set() {
    assert_eq!(
        Config::default().resolve(None, None, None),
        ResolvedConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_path: None,
            show_tool_results: true,
        }
    );
}

#[test]
fn test_config_key_parsing() {
    assert_eq!("base-url".parse::<ConfigKey>(), Ok(ConfigKey::BaseUrl));
    assert_eq!("DATA_PATH".parse::<ConfigKey>(), Ok(ConfigKey::DataPath));
    assert_eq!(
        "show-tool-results".parse::<ConfigKey>(),
        Ok(ConfigKey::ShowToolResults)
    );
    let err = "timeout".parse::<ConfigKey>().unwrap_err();
    assert!(err.contains("Unknown config key 'timeout'"));
    assert!(err.contains("base-url, data-path, show-tool-results"));
}

#[test]
fn test_set_validates_values() {
    let mut config = Config::default();
    assert!(config.set(ConfigKey::BaseUrl, "not a url").is_err());
    assert!(config.set(ConfigKey::ShowToolResults, "maybe").is_err());
    assert!(config.set(ConfigKey::DataPath, "   ").is_err());
    assert_eq!(config, Config::default());

    config.set(ConfigKey::ShowToolResults, "ON").unwrap();
    assert_eq!(config.show_tool_results, Some(true));
}

#[test]
fn test_format_all_lists_every_key() {
    let output = Config::default().format_all();
    assert_eq!(
        output,
        "Current configuration:\n  \
         base-url: (unset, defaults to http://localhost:8000)\n  \
         data-path: (unset)\n  \
         show-tool-results: on\n"
    );
}

#[test]
fn test_path_display() {
    let plain = PathBuf::from("/tmp/dqchat/config.toml");
    #[cfg(unix)]
    {
        if std::env::var_os("HOME").is_some_and(|home| !plain.starts_with(home)) {
            assert_eq!(path_display(&plain), "/tmp/dqchat/config.toml");
        }
        if let Some(home) = std::env::var_os("HOME") {
            let under_home = PathBuf::from(home).join(".config/dqchat/config.toml");
            assert_eq!(path_display(&under_home), "~/.config/dqchat/config.toml");
        }
    }
    #[cfg(not(unix))]
    assert_eq!(path_display(&plain), plain.display().to_string());
}
