// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process configuration read from the environment.
//!
//! Three identifiers are required and have no defaults: the Cloudflare
//! account id, the API token and the default tunnel id. All missing names
//! are collected and reported together so a misconfigured deployment fails
//! with one complete message instead of one variable at a time.

use crate::constants::{ENV_ACCOUNT_ID, ENV_API_KEY, ENV_TUNNEL_ID};
use crate::errors::ConfigError;

/// Required runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Cloudflare account id owning the tunnels
    pub account_id: String,
    /// Cloudflare API token used for every remote call
    pub api_token: String,
    /// Tunnel id used when a container does not declare its own
    pub default_tunnel_id: String,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvironment`] naming every unset or
    /// empty required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut values = Vec::new();
        let mut missing = Vec::new();

        for name in [ENV_ACCOUNT_ID, ENV_API_KEY, ENV_TUNNEL_ID] {
            match std::env::var(name) {
                Ok(value) if !value.is_empty() => values.push(value),
                _ => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvironment { names: missing });
        }

        let mut values = values.into_iter();
        Ok(Self {
            account_id: values.next().unwrap_or_default(),
            api_token: values.next().unwrap_or_default(),
            default_tunnel_id: values.next().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
