//! Service configuration from the environment.

use std::time::Duration;

use thiserror::Error;

use crate::clients::StaticCityDirectory;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Base URLs of the collaborating services.
#[derive(Clone, Debug)]
pub struct CollaboratorConfig {
    pub geocoder_url: String,
    pub pricing_url: String,
    pub loyalty_url: String,
    pub delay_url: String,
    pub auth_url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub collaborators: CollaboratorConfig,
    pub default_city: String,
    pub cities: StaticCityDirectory,
}

impl AppConfig {
    /// Create config from environment variables.
    ///
    /// - `DATABASE_URL`: Required Postgres URL
    /// - `GEOCODER_URL`, `PRICING_URL`, `LOYALTY_URL`, `DELAY_URL`, `AUTH_URL`: Required
    /// - `PORT`: Optional (default: 8083)
    /// - `DATABASE_MAX_CONNECTIONS`: Optional (default: 10)
    /// - `COLLABORATOR_TIMEOUT_SECS`: Optional (default: 10)
    /// - `DEFAULT_CITY`: Optional (default: "default")
    /// - `DEFAULT_CITY_RADIUS`: Optional search radius in meters (default: 30000)
    /// - `CITY_RADII`: Optional `slug=meters` list, comma separated
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| lookup(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key));
        let parsed = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
                None => Ok(default),
            }
        };
        let narrow = |key: &'static str, value: u64| -> Result<u32, ConfigError> {
            u32::try_from(value).map_err(|_| ConfigError::Invalid { key, value: value.to_string() })
        };

        let radii = match lookup("CITY_RADII") {
            Some(raw) => StaticCityDirectory::parse_radii(&raw).map_err(|value| ConfigError::Invalid { key: "CITY_RADII", value })?,
            None => Default::default(),
        };
        let port = parsed("PORT", 8083)?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: narrow("DATABASE_MAX_CONNECTIONS", parsed("DATABASE_MAX_CONNECTIONS", 10)?)?,
            port: u16::try_from(port).map_err(|_| ConfigError::Invalid { key: "PORT", value: port.to_string() })?,
            collaborators: CollaboratorConfig {
                geocoder_url: required("GEOCODER_URL")?,
                pricing_url: required("PRICING_URL")?,
                loyalty_url: required("LOYALTY_URL")?,
                delay_url: required("DELAY_URL")?,
                auth_url: required("AUTH_URL")?,
                timeout: Duration::from_secs(parsed("COLLABORATOR_TIMEOUT_SECS", 10)?),
            },
            default_city: lookup("DEFAULT_CITY").unwrap_or_else(|| "default".to_string()),
            cities: StaticCityDirectory::new(narrow("DEFAULT_CITY_RADIUS", parsed("DEFAULT_CITY_RADIUS", 30000)?)?, radii),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CityDirectory;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 6] = [
        ("DATABASE_URL", "postgres://localhost/carts"),
        ("GEOCODER_URL", "http://geo"),
        ("PRICING_URL", "http://pricing"),
        ("LOYALTY_URL", "http://loyalty"),
        ("DELAY_URL", "http://delay"),
        ("AUTH_URL", "http://auth"),
    ];

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(env(&BASE)).unwrap();
        assert_eq!(config.port, 8083);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.collaborators.timeout, Duration::from_secs(10));
        assert_eq!(config.default_city, "default");
        assert_eq!(config.cities.radius_for_city("anywhere"), 30000);
    }

    #[test]
    fn test_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([("PORT", "9000"), ("CITY_RADII", "spb=25000"), ("DEFAULT_CITY", "spb")]);
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.default_city, "spb");
        assert_eq!(config.cities.radius_for_city("spb"), 25000);
    }

    #[test]
    fn test_missing_and_invalid() {
        let err = AppConfig::from_lookup(env(&BASE[1..])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = AppConfig::from_lookup(env(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
    }
}
