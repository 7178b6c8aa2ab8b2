use std::collections::BTreeMap;

use derive_more::{Display, Error};
use serde::Serialize;

use super::ServiceKey;

/// オプションサービス
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddOnService {
    key: ServiceKey,
    name: String,
    price: f64,
}

impl AddOnService {
    pub fn create(key: ServiceKey, name: String, price: f64) -> Result<Self, ServiceError> {
        Self::validate_name(&key, &name)?;
        Self::validate_price(&key, price)?;
        Ok(Self { key, name, price })
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    fn validate_name(key: &ServiceKey, name: &str) -> Result<(), ServiceError> {
        match name.trim().is_empty() {
            true => Err(ServiceError::NameIsBlank { key: key.clone() }),
            false => Ok(()),
        }
    }

    fn validate_price(key: &ServiceKey, price: f64) -> Result<(), ServiceError> {
        match price.is_finite() && price >= 0.0 {
            true => Ok(()),
            false => Err(ServiceError::InvalidPrice {
                key: key.clone(),
                price,
            }),
        }
    }
}

/// オプションサービスの一覧
///
/// 登録済みのサービスは全て有効な料金を持つ。
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceCatalog {
    services: BTreeMap<ServiceKey, AddOnService>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_from_services<I>(services: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = AddOnService>,
    {
        let mut catalog = Self::new();
        for service in services {
            catalog.insert(service)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, service: AddOnService) -> Result<(), ServiceError> {
        if self.services.contains_key(&service.key) {
            return Err(ServiceError::DuplicateKey {
                key: service.key.clone(),
            });
        }
        self.services.insert(service.key.clone(), service);
        Ok(())
    }

    pub fn get(&self, key: &ServiceKey) -> Option<&AddOnService> {
        self.services.get(key)
    }

    pub fn price_of(&self, key: &ServiceKey) -> Option<f64> {
        self.get(key).map(AddOnService::price)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddOnService> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// オプションサービスエラー
#[derive(Display, Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Name of service {} cannot be blank", key)]
    NameIsBlank { key: ServiceKey },
    #[display(fmt = "Price of service {} must be non-negative, got {}", key, price)]
    InvalidPrice { key: ServiceKey, price: f64 },
    #[display(fmt = "Service {} is already in the catalog", key)]
    DuplicateKey { key: ServiceKey },
}
