use crucible::Config;

use super::FIXTURES_PATH;

#[test]
fn load_valid_full_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_full.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.languages.contains_key("cpp17"));
    assert!(config.languages.contains_key("c11"));
    assert_eq!(config.default_limits.time_limit, Some(20.0));
    assert_eq!(config.max_source_size, 262144);
}

#[test]
fn load_valid_minimal_config() {
    let path = format!("{FIXTURES_PATH}/configs/valid_minimal.toml");
    let config = Config::from_file(&path).expect("Failed to load config");

    assert!(config.languages.contains_key("test"));
    // Unspecified bounds fall back to defaults
    assert_eq!(config.max_source_size, 1024 * 1024);
}

#[test]
fn load_invalid_empty_name() {
    let path = format!("{FIXTURES_PATH}/configs/invalid_empty_name.toml");
    let result = Config::from_file(&path);
    assert!(result.is_err());
}

#[test]
fn load_missing_file() {
    let path = format!("{FIXTURES_PATH}/configs/does_not_exist.toml");
    let result = Config::from_file(&path);
    assert!(result.is_err());
}
