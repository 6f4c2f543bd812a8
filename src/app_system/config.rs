//! Machine configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{default_catalog, CatalogEntry};

/// How much of a customer's selection history a settle or inventory call acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlementMode {
    /// Only selections added since the previous call.
    #[default]
    Incremental,
    /// Every selection on record, on every call.
    Cumulative,
}

impl FromStr for SettlementMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incremental" => Ok(SettlementMode::Incremental),
            "cumulative" => Ok(SettlementMode::Cumulative),
            _ => Err(ConfigError::InvalidValue("SODA_SETTLEMENT_MODE".to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Balance a customer starts with when none is given (SMS orders).
    pub default_balance: Decimal,

    pub settlement_mode: SettlementMode,

    /// Capacity of each record store's request channel
    pub channel_buffer: usize,

    /// Stock seeded at startup
    pub catalog: Vec<CatalogEntry>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            default_balance: Decimal::from(100),
            settlement_mode: SettlementMode::default(),
            channel_buffer: 32,
            catalog: default_catalog(),
        }
    }
}

impl MachineConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; missing keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_balance = match lookup("SODA_DEFAULT_BALANCE") {
            Some(raw) => {
                let value = Decimal::from_str(raw.trim())
                    .map_err(|_| ConfigError::InvalidValue("SODA_DEFAULT_BALANCE".to_string()))?;
                if value < Decimal::ZERO {
                    return Err(ConfigError::InvalidValue("SODA_DEFAULT_BALANCE".to_string()));
                }
                value
            }
            None => defaults.default_balance,
        };

        let settlement_mode = match lookup("SODA_SETTLEMENT_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.settlement_mode,
        };

        let channel_buffer = match lookup("SODA_CHANNEL_BUFFER") {
            Some(raw) => raw.trim().parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("SODA_CHANNEL_BUFFER".to_string()))?,
            None => defaults.channel_buffer,
        };

        let catalog = match lookup("SODA_CATALOG") {
            Some(raw) => parse_catalog(&raw)?,
            None => defaults.catalog,
        };

        Ok(Self {
            default_balance,
            settlement_mode,
            channel_buffer,
            catalog,
        })
    }
}

/// Parses `Name:quantity:price` entries separated by commas.
fn parse_catalog(raw: &str) -> Result<Vec<CatalogEntry>, ConfigError> {
    let mut entries = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parts: Vec<&str> = item.split(':').map(str::trim).collect();
        let [name, quantity, price] = parts.as_slice() else {
            return Err(ConfigError::InvalidCatalogEntry(item.to_string()));
        };
        let quantity = quantity.parse()
            .map_err(|_| ConfigError::InvalidCatalogEntry(item.to_string()))?;
        let price = price.parse()
            .map_err(|_| ConfigError::InvalidCatalogEntry(item.to_string()))?;
        entries.push(CatalogEntry::new(*name, quantity, price));
    }
    if entries.is_empty() {
        return Err(ConfigError::MissingRequired("SODA_CATALOG".to_string()));
    }
    Ok(entries)
}

/// Configuration error types.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid catalog entry '{0}', expected Name:quantity:price")]
    InvalidCatalogEntry(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
