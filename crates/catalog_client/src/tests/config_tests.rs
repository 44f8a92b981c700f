use super::{load_settings, Settings};

use std::{
    collections::HashMap,
    env, fs,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

#[test]
fn defaults_target_open_food_facts() {
    let settings = Settings::default();
    assert_eq!(
        settings.base_url().expect("base url").as_str(),
        "https://world.openfoodfacts.org/"
    );
    assert_eq!(settings.search_page_size, 100);
    assert_eq!(settings.category_limit, 20);
    assert_eq!(settings.page_size, 20);
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn base_url_keeps_path_prefix_as_directory() {
    let settings = Settings {
        api_base_url: "http://127.0.0.1:9000/mirror".into(),
        ..Settings::default()
    };
    let base = settings.base_url().expect("base url");
    assert_eq!(
        base.join("categories.json").expect("join").as_str(),
        "http://127.0.0.1:9000/mirror/categories.json"
    );
}

#[test]
fn rejects_non_http_base_url() {
    let settings = Settings {
        api_base_url: "ftp://example.org".into(),
        ..Settings::default()
    };
    assert!(settings.base_url().is_err());

    let settings = Settings {
        api_base_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(settings.base_url().is_err());
}

#[test]
fn toml_overlay_accepts_strings_and_integers() {
    let mut settings = Settings::default();
    settings
        .apply_toml(
            r#"
api_base_url = "http://localhost:8080"
page_size = 5
search_page_size = "50"
request_timeout_secs = 3
unknown = "ignored"
"#,
        )
        .expect("toml");

    assert_eq!(settings.api_base_url, "http://localhost:8080");
    assert_eq!(settings.page_size, 5);
    assert_eq!(settings.search_page_size, 50);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(3)));
}

#[test]
fn env_overlay_ignores_invalid_numbers() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("APP__PAGE_SIZE", "0"),
        ("APP__CATEGORY_LIMIT", "many"),
        ("APP__USER_AGENT", "tests/1.0"),
        ("APP__REQUEST_TIMEOUT_SECS", "0"),
    ]);

    let mut settings = Settings::default();
    settings.apply_env(|key| vars.get(key).map(|value| value.to_string()));

    assert_eq!(settings.page_size, 20);
    assert_eq!(settings.category_limit, 20);
    assert_eq!(settings.user_agent, "tests/1.0");
    assert_eq!(settings.request_timeout_secs, None);
}

#[test]
fn load_settings_reads_file_when_present() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("catalog_client_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("explorer.toml");
    fs::write(&path, "category_limit = 7\n").expect("write config");

    let settings = load_settings(&path);
    assert_eq!(settings.category_limit, 7);

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn load_settings_tolerates_missing_file() {
    let settings = load_settings(std::path::Path::new("definitely/not/here/explorer.toml"));
    assert_eq!(settings.search_page_size, Settings::default().search_page_size);
}
