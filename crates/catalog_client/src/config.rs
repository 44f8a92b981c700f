use std::{fs, path::Path, time::Duration};

use tracing::warn;
use url::Url;

use crate::error::DirectoryError;

pub const DEFAULT_CONFIG_PATH: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub user_agent: String,
    pub search_page_size: u32,
    pub category_limit: usize,
    pub page_size: usize,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://world.openfoodfacts.org".into(),
            user_agent: concat!("food-catalog-explorer/", env!("CARGO_PKG_VERSION")).into(),
            search_page_size: 100,
            category_limit: 20,
            page_size: 20,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Parsed base url, always ending in `/` so relative endpoints join below it.
    pub fn base_url(&self) -> Result<Url, DirectoryError> {
        let raw = self.api_base_url.trim();
        let mut url = Url::parse(raw).map_err(|source| DirectoryError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DirectoryError::UnsupportedUrl(raw.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Overlays keys from a flat TOML document. Unknown keys are ignored.
    pub fn apply_toml(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let table: toml::Table = toml::from_str(raw)?;
        for (key, value) in table {
            let text = match value {
                toml::Value::String(text) => text,
                toml::Value::Integer(number) => number.to_string(),
                other => {
                    warn!("config: ignoring non-scalar value for key={key}: {other}");
                    continue;
                }
            };
            self.apply_value(&key, &text);
        }
        Ok(())
    }

    /// Overlays `APP__*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in [
            "api_base_url",
            "user_agent",
            "search_page_size",
            "category_limit",
            "page_size",
            "request_timeout_secs",
        ] {
            let var = format!("APP__{}", key.to_ascii_uppercase());
            if let Some(value) = lookup(&var) {
                self.apply_value(key, &value);
            }
        }
    }

    fn apply_value(&mut self, key: &str, value: &str) {
        let value = value.trim();
        match key {
            "api_base_url" => self.api_base_url = value.to_string(),
            "user_agent" => self.user_agent = value.to_string(),
            "search_page_size" => {
                if let Some(parsed) = parse_positive::<u32>(key, value) {
                    self.search_page_size = parsed;
                }
            }
            "category_limit" => {
                if let Some(parsed) = parse_positive::<usize>(key, value) {
                    self.category_limit = parsed;
                }
            }
            "page_size" => {
                if let Some(parsed) = parse_positive::<usize>(key, value) {
                    self.page_size = parsed;
                }
            }
            "request_timeout_secs" => {
                if let Ok(parsed) = value.parse::<u64>() {
                    self.request_timeout_secs = (parsed > 0).then_some(parsed);
                } else {
                    warn!("config: ignoring unparsable request_timeout_secs={value}");
                }
            }
            _ => {}
        }
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Some(parsed),
        _ => {
            warn!("config: ignoring invalid {key}={value}");
            None
        }
    }
}

/// Defaults, then the TOML file at `path` when it exists, then the environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            if let Err(err) = settings.apply_toml(&raw) {
                warn!("config: ignoring malformed {}: {err}", path.display());
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("config: failed to read {}: {err}", path.display()),
    }

    settings.apply_env(|key| std::env::var(key).ok());
    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
