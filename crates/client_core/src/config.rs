use std::{collections::HashMap, fs};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
        }
    }
}

/// Layered lookup: built-in default, then `dashboard.toml` in the working
/// directory, then the `HRM_API_URL` environment variable.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dashboard.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("HRM_API_URL") {
        settings.api_base_url = v;
    }

    settings
}

/// Validate and normalize the endpoint base before handing it to the store
/// client: http(s) only, no trailing slash.
pub fn prepare_base_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid api base url '{raw}'"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("unsupported scheme '{}' in api base url", url.scheme());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
