// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for environment-based settings.
//!
//! Process environment is shared state, so these tests serialize on one
//! lock and restore nothing - each test sets every variable it cares
//! about.

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::config::Settings;
    use crate::constants::{ENV_ACCOUNT_ID, ENV_API_KEY, ENV_TUNNEL_ID};
    use crate::errors::ConfigError;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn set_all() {
        std::env::set_var(ENV_ACCOUNT_ID, "account_id");
        std::env::set_var(ENV_API_KEY, "api_key");
        std::env::set_var(ENV_TUNNEL_ID, "tunnel_id");
    }

    #[test]
    fn test_all_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.account_id, "account_id");
        assert_eq!(settings.api_token, "api_key");
        assert_eq!(settings.default_tunnel_id, "tunnel_id");
    }

    #[test]
    fn test_missing_variable_is_reported() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();
        std::env::remove_var(ENV_TUNNEL_ID);

        let err = Settings::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvironment {
                names: vec![ENV_TUNNEL_ID.to_string()],
            }
        );
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();
        std::env::set_var(ENV_API_KEY, "");

        let err = Settings::from_env().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvironment {
                names: vec![ENV_API_KEY.to_string()],
            }
        );
    }

    #[test]
    fn test_all_missing_names_collected_together() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var(ENV_ACCOUNT_ID);
        std::env::remove_var(ENV_API_KEY);
        std::env::remove_var(ENV_TUNNEL_ID);

        let err = Settings::from_env().unwrap_err();
        let ConfigError::MissingEnvironment { names } = err;
        assert_eq!(
            names,
            vec![
                ENV_ACCOUNT_ID.to_string(),
                ENV_API_KEY.to_string(),
                ENV_TUNNEL_ID.to_string(),
            ]
        );
    }
}
