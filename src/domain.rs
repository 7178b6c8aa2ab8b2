pub mod booking;

use std::error::Error as StdError;

use derive_more::{Display, Error};
use serde::Serialize;

use self::booking::ServiceKey;

/// 外部データ取得エラー
#[derive(Display, Debug)]
pub enum DataAccessError {
    #[display(fmt = "Data read error: {}", _0)]
    ReadError(Box<dyn StdError + Send + Sync>),
    #[display(fmt = "Data decode error: {}", _0)]
    DecodeError(Box<dyn StdError + Send + Sync>),
}

impl StdError for DataAccessError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DataAccessError::ReadError(e) | DataAccessError::DecodeError(e) => Some(e.as_ref()),
        }
    }
}

/// 診断の重大度
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// 計算は続行される
    Warning,
    /// 結果は中立値に置き換えられる
    Error,
}

/// 時刻が範囲外になった理由
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Display)]
pub enum RangeViolation {
    #[display(fmt = "start is outside the day")]
    StartOutsideDay,
    #[display(fmt = "slot runs past midnight")]
    EndPastMidnight,
}

/// 桁あふれした料金の項目
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Display)]
pub enum CostComponent {
    #[display(fmt = "base cost")]
    Base,
    #[display(fmt = "services cost")]
    Services,
    #[display(fmt = "total cost")]
    Total,
}

/// 入力の診断
#[derive(Clone, Debug, PartialEq, Serialize, Display, Error)]
pub enum BookingIssue {
    #[display(fmt = "Duration must be at least one hour, got {}", hours)]
    InvalidDuration { hours: i64 },
    #[display(fmt = "Hourly rate must be a non-negative finite amount, got {}", rate)]
    InvalidRate { rate: f64 },
    #[display(fmt = "The {} is too large to compute", component)]
    CostOverflow { component: CostComponent },
    #[display(fmt = "Unknown service key: {}", key)]
    UnknownServiceKey { key: ServiceKey },
    #[display(fmt = "Time out of range ({} minutes): {}", minutes, reason)]
    OutOfRangeTime {
        minutes: i32,
        reason: RangeViolation,
    },
}

impl BookingIssue {
    pub fn severity(&self) -> Severity {
        match self {
            BookingIssue::InvalidDuration { .. }
            | BookingIssue::InvalidRate { .. }
            | BookingIssue::CostOverflow { .. } => Severity::Error,
            BookingIssue::UnknownServiceKey { .. } => Severity::Warning,
            BookingIssue::OutOfRangeTime { reason, .. } => match reason {
                RangeViolation::StartOutsideDay => Severity::Error,
                RangeViolation::EndPastMidnight => Severity::Warning,
            },
        }
    }
}

/// 診断付きの評価結果
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation<T> {
    value: T,
    issues: Vec<BookingIssue>,
}

impl<T> Evaluation<T> {
    pub(crate) fn new(value: T, issues: Vec<BookingIssue>) -> Self {
        Self { value, issues }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn issues(&self) -> &[BookingIssue] {
        &self.issues
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &BookingIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
    }

    pub fn into_parts(self) -> (T, Vec<BookingIssue>) {
        (self.value, self.issues)
    }
}
