// Application configuration, loaded via the `config` crate with `.env` support.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Base URL of the upstream marketplace REST API, e.g. "https://api.example.com/api".
    pub api_base_url: String,
    pub server_address: String,
    /// Path of the JSON cache file standing in for the browser's localStorage
    /// (selected location, cached filter snapshot).
    pub local_cache_path: String,
    /// Milliseconds to wait after the last filter change before auto-applying.
    pub auto_apply_debounce_ms: u64,
    /// Minimum milliseconds between two load-more triggers.
    pub load_more_lock_ms: u64,
    /// Seconds a fetched facet option list stays cached.
    pub facet_cache_ttl_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            // Add default values
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("api_base_url", "http://127.0.0.1:8000/api")?
            .set_default("local_cache_path", "local_cache.json")?
            .set_default("auto_apply_debounce_ms", 500)?
            .set_default("load_more_lock_ms", 1000)?
            .set_default("facet_cache_ttl_secs", 600)?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_API_BASE_URL)
            .add_source(Environment::with_prefix("APP").separator("_"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Joins an endpoint path onto the API base, tolerating slashes on either side.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> Settings {
        Settings {
            api_base_url: "http://api.test/api".to_string(),
            server_address: "127.0.0.1:3000".to_string(),
            local_cache_path: "local_cache.json".to_string(),
            auto_apply_debounce_ms: 500,
            load_more_lock_ms: 1000,
            facet_cache_ttl_secs: 600,
        }
    }

    #[test]
    fn api_url_joins_without_doubled_slash() {
        let settings = test_settings();
        assert_eq!(settings.api_url("/filter"), "http://api.test/api/filter");
        assert_eq!(settings.api_url("filter"), "http://api.test/api/filter");
    }
}
