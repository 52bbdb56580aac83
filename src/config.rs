// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

const DEFAULT_SESSION_FILE: &str = ".cognito-session.json";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region of the user pool
    pub region: String,
    /// User pool app client ID (public, no secret)
    pub client_id: String,
    /// Override for the provider endpoint (local emulators)
    pub cognito_endpoint: Option<String>,
    /// Base URL of the bearer-authenticated REST API
    pub api_base_url: Option<String>,
    /// Where the session store is persisted
    pub session_file: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            client_id: "test_client_id".to_string(),
            cognito_endpoint: None,
            api_base_url: None,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            region: env::var("COGNITO_REGION").map_err(|_| ConfigError::Missing("COGNITO_REGION"))?,
            client_id: env::var("COGNITO_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("COGNITO_CLIENT_ID"))?,
            cognito_endpoint: non_empty_var("COGNITO_ENDPOINT"),
            api_base_url: non_empty_var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            session_file: non_empty_var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE)),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
