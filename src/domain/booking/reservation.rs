use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::domain::DataAccessError;

use super::{ResourceId, TimeInterval};

/// 予約済み時間帯の取得元
#[async_trait]
pub trait ReservationSource {
    /// 施設と日付から予約済みの時間帯を取得する
    async fn find_by_date(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<ReservationConflict>, DataAccessError>;
}

/// 他の利用者が予約済みの時間帯
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref,
)]
#[serde(transparent)]
pub struct ReservationConflict(TimeInterval);

impl ReservationConflict {
    pub fn new(interval: TimeInterval) -> Self {
        Self(interval)
    }

    pub fn interval(&self) -> TimeInterval {
        self.0
    }
}
