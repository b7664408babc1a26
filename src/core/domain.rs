use std::path::PathBuf;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIBRARY_FILE: &str = "library.json";
pub const DEFAULT_LOOKUP_URL: &str = "https://openlibrary.org";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// Configuration abstracts config options for the library catalog
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub library_file: PathBuf,
    pub lookup_base_url: String,
    pub lookup_timeout_secs: u64,
    pub bind_addr: String,
}

impl Configuration {
    pub fn new() -> Self {
        Configuration {
            library_file: PathBuf::from(DEFAULT_LIBRARY_FILE),
            lookup_base_url: DEFAULT_LOOKUP_URL.to_string(),
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }

    // Defaults overridden by LIBRARY_FILE, OPENLIBRARY_URL, LOOKUP_TIMEOUT_SECS
    // and LIBRARY_BIND_ADDR.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(var: F) -> Self {
        let mut config = Configuration::new();
        if let Some(file) = var("LIBRARY_FILE").filter(|v| !v.trim().is_empty()) {
            config.library_file = PathBuf::from(file);
        }
        if let Some(url) = var("OPENLIBRARY_URL").filter(|v| !v.trim().is_empty()) {
            config.lookup_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = var("LOOKUP_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            if secs > 0 {
                config.lookup_timeout_secs = secs;
            }
        }
        if let Some(addr) = var("LIBRARY_BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr;
        }
        config
    }
}
