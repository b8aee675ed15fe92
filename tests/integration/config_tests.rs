use clap::Parser;
use figment::providers::Serialized;
use figment::Figment;
use std::fs;
use std::sync::Mutex;
use steep::cli::Cli;
use steep::compiler::CollisionPolicy;
use steep::config::{Config, ConfigError};
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_env_overrides_file_and_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("steep.toml");
    fs::write(
        &path,
        "engine = \"html\"\nrecursive = true\ntemplates = \"views\"\n",
    )
    .unwrap();

    std::env::set_var("STEEP_ENGINE", "jinja");
    std::env::set_var("STEEP_RECURSIVE", "false");
    std::env::set_var("STEEP_ON_COLLISION", "last-write-wins");

    let loaded = Config::load(Some(&path));

    // Clean up before asserting so a failure does not leak into other tests
    std::env::remove_var("STEEP_ENGINE");
    std::env::remove_var("STEEP_RECURSIVE");
    std::env::remove_var("STEEP_ON_COLLISION");

    let mut config = loaded.unwrap();
    assert_eq!(config.templates, std::path::PathBuf::from("views"));
    assert_eq!(config.engine, "jinja");
    assert!(!config.recursive);
    assert_eq!(config.on_collision, CollisionPolicy::LastWriteWins);

    let cli = Cli::parse_from([
        "steep",
        "--engine",
        "mustache",
        "--on-collision",
        "error",
        "list",
    ]);
    config.apply_cli(&cli);
    config.validate().unwrap();

    assert_eq!(config.engine, "mustache");
    assert_eq!(config.on_collision, CollisionPolicy::Error);
    assert!(!config.recursive);
    assert_eq!(config.compile_options().unwrap().extension, ".html.mustache");
}

#[test]
fn test_config_invalid_file_values_can_be_overridden_by_cli() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempdir().unwrap();
    let path = dir.path().join("steep.toml");
    fs::write(&path, "engine = \"amber\"\nextension = \"html\"\n").unwrap();

    let mut config = Config::load(Some(&path)).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Engine(_))));

    let cli = Cli::parse_from(["steep", "--engine", "html", "--ext", ".htm", "list"]);
    config.apply_cli(&cli);
    config.validate().unwrap();
    assert_eq!(config.compile_options().unwrap().extension, ".htm");
}

#[test]
fn test_config_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "engine = \"jinja\"\ntemplates = \"views\"\n").unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.engine, "jinja");
    assert_eq!(config.templates, std::path::PathBuf::from("views"));
    assert_eq!(config.compile_options().unwrap().extension, ".html.j2");
}

#[test]
fn test_config_invalid_type_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("steep.toml");
    fs::write(&path, "recursive = \"sometimes\"\n").unwrap();

    assert!(matches!(
        Config::load_from_path(&path),
        Err(ConfigError::Extract(_))
    ));
}

#[test]
fn test_config_unknown_engine_suggests_closest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("steep.toml");
    fs::write(&path, "engine = \"jinj\"\n").unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("did you mean 'jinja'"));
}
