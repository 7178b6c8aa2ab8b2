use std::path::PathBuf;

use config::{
    builder::{ConfigBuilder, DefaultState},
    Config, ConfigError, Environment,
};
use serde::Deserialize;

use crate::domain::booking::{AddOnService, Currency, PricingPolicy, ServiceCatalog, ServiceError};

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Deserialize)]
pub struct TurfConfig {
    pub logger: Logger,
    #[serde(default)]
    pub pricing: PricingPolicy,
    #[serde(default)]
    pub catalog: Catalog,
    pub reservations: Reservations,
}

impl TurfConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(
            Config::builder().add_source(config::File::with_name("turf.toml")),
            Self::environment(),
        )
    }

    /// `TURF__PRICING__WEEKEND_SURCHARGE` のように `__` で階層を区切る
    fn environment() -> Environment {
        Environment::with_prefix("TURF").separator("__")
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        builder
            .add_source(environment)
            .build()?
            .try_deserialize::<TurfConfig>()
    }

    pub fn service_catalog(&self) -> Result<ServiceCatalog, ServiceError> {
        ServiceCatalog::try_from_services(
            self.catalog
                .services
                .iter()
                .map(|s| AddOnService::create(s.key.as_str().into(), s.name.clone(), s.price))
                .collect::<Result<Vec<_>, _>>()?,
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServiceEntry {
    pub key: String,
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Reservations {
    pub path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
