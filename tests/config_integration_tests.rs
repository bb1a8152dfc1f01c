//! Layered configuration from user, project and command-line sources
use sheet_ranges::config::{find_project_config, Config, PROJECT_CONFIG_FILE};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_builtin_defaults_without_files() {
    let dir = tempdir().unwrap();
    let config = Config::resolve(None, None, dir.path(), None).expect("resolve config");

    assert!(!config.has_project_config());
    assert!(config.user_config_path.is_none());
    assert_eq!(config.palette, Config::builtin().palette);
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_project_config_found_in_ancestor() {
    let dir = tempdir().unwrap();
    let project_file = dir.path().join(PROJECT_CONFIG_FILE);
    fs::write(&project_file, "default_sheets = [\"Inputs\", \"Outputs\"]\n").unwrap();

    let nested = dir.path().join("reports").join("2026");
    fs::create_dir_all(&nested).unwrap();

    assert_eq!(find_project_config(&nested), Some(project_file.clone()));

    let config = Config::resolve(None, None, &nested, None).expect("resolve config");
    assert!(config.has_project_config());
    assert_eq!(config.project_config_path, Some(project_file));
    assert_eq!(
        config.default_sheets,
        vec!["Inputs".to_string(), "Outputs".to_string()]
    );
}

#[test]
fn test_priority_user_then_project_then_cli() {
    let dir = tempdir().unwrap();
    let user_file = dir.path().join("user.toml");
    fs::write(
        &user_file,
        "palette = [\"#000000\"]\nlog_level = \"warn\"\ndefault_sheets = [\"Mine\"]\n",
    )
    .unwrap();

    let project = dir.path().join("project");
    fs::create_dir_all(&project).unwrap();
    fs::write(
        project.join(PROJECT_CONFIG_FILE),
        "palette = [\"#FFFFFF\", \"#EEEEEE\"]\nlog_level = \"error\"\n",
    )
    .unwrap();

    let config =
        Config::resolve(None, Some("debug"), &project, Some(&user_file)).expect("resolve config");

    assert_eq!(config.user_config_path, Some(user_file));
    // project beats user
    assert_eq!(config.palette, vec!["#FFFFFF".to_string(), "#EEEEEE".to_string()]);
    // user value survives where the project is silent
    assert_eq!(config.default_sheets, vec!["Mine".to_string()]);
    // command line beats both
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_explicit_config_replaces_discovery() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join(PROJECT_CONFIG_FILE),
        "default_sheets = [\"Discovered\"]\n",
    )
    .unwrap();
    let explicit = dir.path().join("custom.toml");
    fs::write(&explicit, "default_sheets = [\"Explicit\"]\n").unwrap();

    let config = Config::resolve(Some(&explicit), None, dir.path(), None).expect("resolve config");
    assert_eq!(config.default_sheets, vec!["Explicit".to_string()]);
    assert_eq!(config.project_config_path, Some(explicit));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = Config::resolve(Some(&missing), None, dir.path(), None).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join(PROJECT_CONFIG_FILE);

    fs::write(&file, "palette = [\"blue\"]\n").unwrap();
    let err = Config::resolve(None, None, dir.path(), None).unwrap_err();
    assert!(err.to_string().contains("Invalid palette color 'blue'"));

    fs::write(&file, "default_sheets = []\n").unwrap();
    assert!(Config::resolve(None, None, dir.path(), None).is_err());

    fs::write(&file, "palette = [\n").unwrap();
    assert!(Config::resolve(None, None, dir.path(), None).is_err());

    fs::remove_file(&file).unwrap();
    assert!(Config::resolve(None, Some("loud"), dir.path(), None).is_err());
}
