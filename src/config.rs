// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Environment configuration.
//!
//! Values come from the process environment, after an optional `.env` file
//! has been loaded by [`load_dotenv`].

use std::path::PathBuf;

use envconfig::Envconfig;
use thiserror::Error;

use crate::engine::DEFAULT_MAX_TRIES;
use crate::notify::{NotifyError, SmtpSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envconfig::Error),

    #[error("SANTA_MAX_TRIES must be at least 1")]
    ZeroMaxTries,
}

#[derive(Envconfig, Debug, Clone)]
pub struct AppConfig {
    /// Unset means [`DEFAULT_MAX_TRIES`].
    #[envconfig(from = "SANTA_MAX_TRIES")]
    pub max_tries: Option<usize>,

    #[envconfig(from = "SANTA_HISTORY_PATH", default = "santa_history.jsonl")]
    pub history_path: PathBuf,

    // Accepts true/1/yes in any case, which a plain bool field would not.
    #[envconfig(from = "SuperSecret", default = "")]
    pub super_secret: String,

    #[envconfig(nested = true)]
    pub smtp: SmtpConfig,
}

/// Raw SMTP variables. Only needed when mail is actually sent.
#[derive(Envconfig, Debug, Clone)]
pub struct SmtpConfig {
    #[envconfig(from = "SMTP_HOST", default = "")]
    pub host: String,

    #[envconfig(from = "SMTP_PORT", default = "465")] // SMTPS
    pub port: u16,

    #[envconfig(from = "SMTP_USERNAME", default = "")]
    pub username: String,

    #[envconfig(from = "SMTP_PASSWORD", default = "")]
    pub password: String,

    #[envconfig(from = "SMTP_FROM", default = "")]
    pub from: String,

    #[envconfig(from = "SMTP_FROM_NAME", default = "")]
    pub from_name: String,
}

/// Load `.env` into the environment if present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env: {}", e),
    }
}

impl AppConfig {
    pub fn max_tries(&self) -> Result<usize, ConfigError> {
        match self.max_tries.unwrap_or(DEFAULT_MAX_TRIES) {
            0 => Err(ConfigError::ZeroMaxTries),
            n => Ok(n),
        }
    }

    pub fn super_secret(&self) -> bool {
        matches!(
            self.super_secret.trim().to_lowercase().as_str(),
            "true" | "1" | "yes"
        )
    }
}

impl SmtpConfig {
    /// Complete settings, or every missing variable at once.
    pub fn settings(&self) -> Result<SmtpSettings, NotifyError> {
        let missing: Vec<&'static str> = [
            ("SMTP_HOST", &self.host),
            ("SMTP_USERNAME", &self.username),
            ("SMTP_PASSWORD", &self.password),
            ("SMTP_FROM", &self.from),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();
        if !missing.is_empty() {
            return Err(NotifyError::MissingSettings(missing));
        }

        let from_name = self.from_name.trim();
        Ok(SmtpSettings {
            host: self.host.trim().to_string(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            sender: self.from.trim().to_string(),
            sender_name: (!from_name.is_empty()).then(|| from_name.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::init_from_hashmap(&env(&[])).unwrap();
        assert_eq!(config.max_tries, None);
        assert_eq!(config.max_tries().unwrap(), DEFAULT_MAX_TRIES);
        assert_eq!(config.history_path, PathBuf::from("santa_history.jsonl"));
        assert!(!config.super_secret());
        assert_eq!(config.smtp.port, 465);
    }

    #[test]
    fn test_super_secret_values() {
        for (value, expected) in [("TRUE", true), ("1", true), ("yes", true), ("no", false), ("", false)] {
            let config = AppConfig::init_from_hashmap(&env(&[("SuperSecret", value)])).unwrap();
            assert_eq!(config.super_secret(), expected, "{value}");
        }
    }

    #[test]
    fn test_zero_max_tries_rejected() {
        let config = AppConfig::init_from_hashmap(&env(&[("SANTA_MAX_TRIES", "0")])).unwrap();
        assert!(matches!(config.max_tries(), Err(ConfigError::ZeroMaxTries)));
    }

    #[test]
    fn test_explicit_max_tries() {
        let config = AppConfig::init_from_hashmap(&env(&[("SANTA_MAX_TRIES", "7")])).unwrap();
        assert_eq!(config.max_tries().unwrap(), 7);
    }

    #[test]
    fn test_bad_number() {
        assert!(AppConfig::init_from_hashmap(&env(&[("SMTP_PORT", "smtp")])).is_err());
    }

    #[test]
    fn test_missing_smtp_reported_together() {
        let config = AppConfig::init_from_hashmap(&env(&[("SMTP_HOST", "smtp.example.com")])).unwrap();
        match config.smtp.settings() {
            Err(NotifyError::MissingSettings(missing)) => {
                assert_eq!(missing, vec!["SMTP_USERNAME", "SMTP_PASSWORD", "SMTP_FROM"]);
            }
            other => panic!("expected missing settings, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_smtp() {
        let config = AppConfig::init_from_hashmap(&env(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2465"),
            ("SMTP_USERNAME", "elf"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_FROM", "elves@example.com"),
        ]))
        .unwrap();
        let settings = config.smtp.settings().unwrap();
        assert_eq!(settings.port, 2465);
        assert_eq!(settings.sender_name, None);
    }
}
