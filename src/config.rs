//! Server configuration from environment variables
//!
//! | Variable            | Default                   |
//! |---------------------|---------------------------|
//! | `REPORT_CARD_STORE` | `json` (or `memory`)      |
//! | `REPORT_CARD_FILE`  | `data/report_cards.json`  |
//! | `BIND_ADDR`         | `0.0.0.0`                 |
//! | `PORT`              | `3000`                    |
//!
//! Unparseable values fall back to the default with a warning.

use crate::repository::DEFAULT_STORAGE_FILE;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

/// Which backing store the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// JSON file, rewritten on every create
    JsonFile,
    /// Process-local list preseeded with sample cards
    Memory,
}

impl StoreKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Some(StoreKind::JsonFile),
            "memory" | "mem" => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreKind,
    pub storage_file: PathBuf,
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::JsonFile,
            storage_file: PathBuf::from(DEFAULT_STORAGE_FILE),
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test map, ...)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("REPORT_CARD_STORE") {
            match StoreKind::parse(&raw) {
                Some(kind) => config.store = kind,
                None => tracing::warn!("Unknown REPORT_CARD_STORE '{}', using json", raw),
            }
        }

        if let Some(path) = lookup("REPORT_CARD_FILE").filter(|p| !p.trim().is_empty()) {
            config.storage_file = PathBuf::from(path);
        }

        if let Some(raw) = lookup("BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => tracing::warn!("Invalid BIND_ADDR '{}', using {}", raw, config.bind_addr),
            }
        }

        if let Some(raw) = lookup("PORT") {
            match raw.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!("Invalid PORT '{}', using {}", raw, config.port),
            }
        }

        config
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
