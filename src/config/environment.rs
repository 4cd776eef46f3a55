// ABOUTME: Environment configuration for the HTTP server process
// ABOUTME: Reads port, database URL and data directory with logged defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Tex Vision Training

//! Environment-based configuration for deployment

use super::session::SessionConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8081;

/// Default database URL
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";

/// Server process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// `sqlite:` URL or `memory`
    pub database_url: String,
    /// Directory holding per-user seen-drills files
    pub data_dir: PathBuf,
    /// Drill session tuning
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `HTTP_PORT` does not parse or session overrides are invalid
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let http_port = env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
            .parse()
            .context("Invalid HTTP_PORT value")?;
        let database_url = env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL);
        let data_dir = env::var("TEX_VISION_DATA_DIR")
            .map_or_else(|_| default_data_dir(), PathBuf::from);
        let session = SessionConfig::from_env().context("Invalid session configuration")?;

        Ok(Self {
            http_port,
            database_url,
            data_dir,
            session,
        })
    }

    /// One-line description for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} data_dir={}",
            self.http_port,
            redact_database_url(&self.database_url),
            self.data_dir.display()
        )
    }
}

/// Platform data directory, falling back to the working directory
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tex-vision")
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Strip any query string (may carry credentials or tuning flags)
fn redact_database_url(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_database_url() {
        assert_eq!(redact_database_url("sqlite:data.db?mode=rwc"), "sqlite:data.db");
        assert_eq!(redact_database_url("memory"), "memory");
    }
}
