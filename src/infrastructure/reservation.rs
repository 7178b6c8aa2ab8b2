use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use tracing::debug;

use crate::domain::booking::{
    ReservationConflict, ReservationSource, ResourceId, TimeInterval, TimeOfDay,
};
use crate::domain::DataAccessError;

/// JSON文書から予約済み時間帯を読み込む取得元
///
/// 文書の形式:
/// `{"reservations":[{"resource_id":1,"date":"2024-06-01","start":"10:00","end":"11:00"}]}`
#[derive(Clone, Debug)]
pub struct JsonReservationSource {
    origin: Origin,
}

#[derive(Clone, Debug)]
enum Origin {
    File(PathBuf),
    Loaded(Vec<ReservationRecord>),
}

#[derive(Deserialize)]
struct ReservationDocument {
    reservations: Vec<RawReservation>,
}

#[serde_as]
#[derive(Deserialize)]
struct RawReservation {
    resource_id: ResourceId,
    date: NaiveDate,
    #[serde_as(as = "DisplayFromStr")]
    start: TimeOfDay,
    #[serde_as(as = "DisplayFromStr")]
    end: TimeOfDay,
}

#[derive(Clone, Debug)]
struct ReservationRecord {
    resource_id: ResourceId,
    date: NaiveDate,
    interval: TimeInterval,
}

impl JsonReservationSource {
    /// 問い合わせのたびにファイルを読み直す
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            origin: Origin::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, DataAccessError> {
        Ok(Self {
            origin: Origin::Loaded(decode(data)?),
        })
    }
}

#[async_trait]
impl ReservationSource for JsonReservationSource {
    async fn find_by_date(
        &self,
        resource_id: ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<ReservationConflict>, DataAccessError> {
        let conflicts = match &self.origin {
            Origin::File(path) => {
                let records = decode(&tokio::fs::read(path).await?)?;
                select(&records, resource_id, date)
            }
            Origin::Loaded(records) => select(records, resource_id, date),
        };
        debug!(%resource_id, %date, found = conflicts.len(), "loaded reservations");
        Ok(conflicts)
    }
}

fn decode(data: &[u8]) -> Result<Vec<ReservationRecord>, DataAccessError> {
    let document: ReservationDocument = serde_json::from_slice(data)?;
    document
        .reservations
        .into_iter()
        .map(|raw| -> Result<ReservationRecord, DataAccessError> {
            Ok(ReservationRecord {
                resource_id: raw.resource_id,
                date: raw.date,
                interval: TimeInterval::new(raw.start, raw.end)?,
            })
        })
        .collect()
}

fn select(
    records: &[ReservationRecord],
    resource_id: ResourceId,
    date: NaiveDate,
) -> Vec<ReservationConflict> {
    records
        .iter()
        .filter(|record| record.resource_id == resource_id && record.date == date)
        .map(|record| ReservationConflict::new(record.interval))
        .collect()
}
