mod availability;
mod money;
mod pricing;
mod reservation;
mod service;
mod time;

use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

pub use self::availability::*;
pub use self::money::*;
pub use self::pricing::*;
pub use self::reservation::*;
pub use self::service::*;
pub use self::time::*;

/// 施設ID
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct ResourceId(u64);

/// オプションサービスのキー
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From, Deref,
)]
pub struct ServiceKey(String);

impl From<&str> for ServiceKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
