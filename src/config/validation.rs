//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Unique source keys, exactly one baseline source
//! - Network sources carry an absolute http(s) base address
//! - Value ranges (intervals, timeouts, thresholds > 0)
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::LabConfig;
use crate::routing::source::AdapterKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no sources configured")]
    NoSources,

    #[error("source key must not be empty")]
    EmptyKey,

    #[error("duplicate source key '{0}'")]
    DuplicateKey(String),

    #[error("no source uses the mock adapter")]
    MissingBaseline,

    #[error("more than one mock source: {0:?}")]
    MultipleBaselines(Vec<String>),

    #[error("source '{key}' has invalid base address '{address}'")]
    InvalidBaseAddress { key: String, address: String },

    #[error("health_check.{0} must be greater than zero")]
    ZeroHealthSetting(&'static str),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
}

pub fn validate_config(config: &LabConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.sources.is_empty() {
        errors.push(ValidationError::NoSources);
    }

    let mut seen = HashSet::new();
    let mut baselines = Vec::new();
    for source in &config.sources {
        if source.key.is_empty() {
            errors.push(ValidationError::EmptyKey);
        } else if !seen.insert(source.key.as_str()) {
            errors.push(ValidationError::DuplicateKey(source.key.clone()));
        }

        if source.adapter == AdapterKind::Mock {
            baselines.push(source.key.clone());
        } else if !is_http_url(&source.base_address) {
            errors.push(ValidationError::InvalidBaseAddress {
                key: source.key.clone(),
                address: source.base_address.clone(),
            });
        }
    }

    match baselines.len() {
        0 if !config.sources.is_empty() => errors.push(ValidationError::MissingBaseline),
        0 | 1 => {}
        _ => errors.push(ValidationError::MultipleBaselines(baselines)),
    }

    let health = &config.health_check;
    for (name, value) in [
        ("interval_secs", health.interval_secs),
        ("timeout_secs", health.timeout_secs),
        ("unhealthy_threshold", u64::from(health.unhealthy_threshold)),
        ("healthy_threshold", u64::from(health.healthy_threshold)),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroHealthSetting(name));
        }
    }

    for (name, value) in [
        ("transfer_secs", config.timeouts.transfer_secs),
        ("api_request_secs", config.timeouts.api_request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.api.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.api.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(address: &str) -> bool {
    Url::parse(address)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::SourceConfig;

    fn source(key: &str, adapter: AdapterKind, base: &str) -> SourceConfig {
        SourceConfig {
            key: key.into(),
            display_name: key.into(),
            description: String::new(),
            base_address: base.into(),
            priority: 1,
            adapter,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&LabConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_all_errors() {
        let mut config = LabConfig::default();
        config.sources = vec![
            source("a", AdapterKind::Public, "not a url"),
            source("a", AdapterKind::Training, "http://localhost:3000"),
        ];
        config.health_check.interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateKey("a".into())));
        assert!(errors.contains(&ValidationError::MissingBaseline));
        assert!(errors.contains(&ValidationError::ZeroHealthSetting("interval_secs")));
        assert!(errors.contains(&ValidationError::InvalidBaseAddress {
            key: "a".into(),
            address: "not a url".into()
        }));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_multiple_baselines() {
        let mut config = LabConfig::default();
        config.sources = vec![source("m1", AdapterKind::Mock, ""), source("m2", AdapterKind::Mock, "")];
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MultipleBaselines(vec!["m1".into(), "m2".into()])])
        );
    }

    #[test]
    fn test_empty_sources() {
        let mut config = LabConfig::default();
        config.sources.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoSources]));
    }
}
