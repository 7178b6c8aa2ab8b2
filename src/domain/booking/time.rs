use std::{fmt, ops::Range, str::FromStr};

use chrono::{NaiveTime, Timelike};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// 0時からの経過分で表す時刻
///
/// 範囲外の値も保持できる。範囲の検査は評価時に診断として報告する。
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(i32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn from_minutes(minutes: i32) -> Self {
        Self(minutes)
    }

    pub fn from_hm(hour: i32, minute: i32) -> Self {
        Self(hour.saturating_mul(60).saturating_add(minute))
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    pub fn is_within_day(self) -> bool {
        (0..MINUTES_PER_DAY).contains(&self.0)
    }

    /// 日付をまたいでも折り返さない
    pub fn plus_hours(self, hours: i64) -> Self {
        let minutes = i64::from(self.0).saturating_add(hours.saturating_mul(60));
        Self(minutes.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(value: NaiveTime) -> Self {
        Self((value.hour() * 60 + value.minute()) as i32)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=MINUTES_PER_DAY).contains(&self.0) {
            write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
        } else {
            write!(f, "{}min", self.0)
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24:00" => Ok(Self(MINUTES_PER_DAY)),
            s => NaiveTime::parse_from_str(s, "%H:%M").map(Self::from),
        }
    }
}

/// 半開区間 `[start, end)` の時間帯
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeInterval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, IntervalError> {
        Self::validate(start, end)?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn range(&self) -> Range<i32> {
        self.start.0..self.end.0
    }

    /// 接しているだけの区間は重ならない
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.overlaps_range(&other.range())
    }

    pub fn overlaps_range(&self, range: &Range<i32>) -> bool {
        range.start < self.end.0 && range.end > self.start.0
    }

    fn validate(start: TimeOfDay, end: TimeOfDay) -> Result<(), IntervalError> {
        if start.0 < 0 || end.0 > MINUTES_PER_DAY {
            return Err(IntervalError::OutsideDay { start, end });
        }
        if start >= end {
            return Err(IntervalError::Empty { start, end });
        }
        Ok(())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[serde_as]
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawInterval {
    #[serde_as(as = "DisplayFromStr")]
    start: TimeOfDay,
    #[serde_as(as = "DisplayFromStr")]
    end: TimeOfDay,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = IntervalError;

    fn try_from(value: RawInterval) -> Result<Self, Self::Error> {
        Self::new(value.start, value.end)
    }
}

impl From<TimeInterval> for RawInterval {
    fn from(value: TimeInterval) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

#[derive(Display, Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntervalError {
    #[display(fmt = "Interval {}-{} is empty", start, end)]
    Empty { start: TimeOfDay, end: TimeOfDay },
    #[display(fmt = "Interval {}-{} is outside the day", start, end)]
    OutsideDay { start: TimeOfDay, end: TimeOfDay },
}
