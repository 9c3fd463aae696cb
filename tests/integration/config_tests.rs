use dupfind::config::{Config, ConfigError};
use dupfind::duplicates::CollisionPolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.io_threads, 4);
    assert_eq!(config.collision_policy, CollisionPolicy::Split);
    assert!(!config.skip_unreadable);
    assert!(config.progress);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPFIND_CFGTEST_IO_THREADS", "16");
    std::env::set_var("DUPFIND_CFGTEST_COLLISION_POLICY", "discard");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPFIND_CFGTEST_"));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.collision_policy, CollisionPolicy::Discard);

    std::env::remove_var("DUPFIND_CFGTEST_IO_THREADS");
    std::env::remove_var("DUPFIND_CFGTEST_COLLISION_POLICY");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
io_threads = 8
follow_symlinks = true
skip_hidden = true
ignore_patterns = ["*.tmp", "node_modules/"]
collision_policy = "discard"
progress = false
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.io_threads, 8);
    assert!(config.follow_symlinks);
    assert!(config.skip_hidden);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "node_modules/"]);
    assert_eq!(config.collision_policy, CollisionPolicy::Discard);
    assert!(!config.progress);
}

#[test]
fn test_config_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "skip_unreadable = true\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert!(config.skip_unreadable);
    assert!(config.progress);
    assert!(config.ignore_patterns.is_empty());
}

#[test]
fn test_config_save_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        io_threads: 2,
        collision_policy: CollisionPolicy::Discard,
        ignore_patterns: vec!["*.bak".to_string()],
        ..Config::default()
    };

    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let saved_content = fs::read_to_string(&config_path).unwrap();
    assert!(saved_content.contains("io_threads = 2"));
    assert!(saved_content.contains("collision_policy = \"discard\""));

    let reloaded = Config::load(Some(&config_path)).unwrap();
    assert_eq!(reloaded.collision_policy, CollisionPolicy::Discard);
    assert_eq!(reloaded.ignore_patterns, vec!["*.bak"]);
}

#[test]
fn test_config_invalid_value() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "collision_policy = \"merge\"\n").unwrap();

    match Config::load(Some(&config_path)).unwrap_err() {
        ConfigError::Invalid(_) => {}
        other => panic!("Expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = [").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_missing_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    match Config::load(Some(&missing)).unwrap_err() {
        ConfigError::NotFound(path) => assert_eq!(path, missing),
        other => panic!("Expected NotFound, got {other:?}"),
    }
}
