//! Configuration loading.
//!
//! Configuration lives in a single JSON file (`tplstudio.json` by default).
//! A missing file is generated with defaults so a fresh install starts with
//! the standard PRTG directory layout rooted at the working directory.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tplstudio_store::{Namespace, NamespaceTable};
use tracing::info;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Basic Auth credentials.
    pub auth: AuthSection,
    /// Namespace table: document type to directory and extension allow-list.
    pub namespaces: Vec<NamespaceConfig>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Basic Auth credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub username: String,
    pub password: String,
}

/// One namespace entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub key: String,
    pub root: PathBuf,
    pub extensions: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "changeme".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthSection::default(),
            namespaces: vec![
                NamespaceConfig {
                    key: "device".to_string(),
                    root: PathBuf::from("./devicetemplates"),
                    extensions: vec![".odt".to_string()],
                },
                NamespaceConfig {
                    key: "snmp".to_string(),
                    root: PathBuf::from("./snmplibs"),
                    extensions: vec![".oidlib".to_string(), ".xml".to_string()],
                },
                NamespaceConfig {
                    key: "lookup".to_string(),
                    root: PathBuf::from("./lookups"),
                    extensions: vec![".ovl".to_string(), ".xml".to_string()],
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from `path`, generating a default file if none
    /// exists yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            let json = serde_json::to_string_pretty(&config)?;
            std::fs::write(path, json)
                .with_context(|| format!("failed to write default config to {}", path.display()))?;
            info!(path = %path.display(), "generated default configuration");
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config in {}", path.display()))
    }

    /// Build the store's namespace table from this configuration.
    pub fn namespace_table(&self) -> NamespaceTable {
        NamespaceTable::new(self.namespaces.iter().map(|ns| {
            Namespace::new(ns.key.clone(), ns.root.clone(), ns.extensions.clone())
        }))
    }
}
