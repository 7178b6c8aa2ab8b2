use bio::data_structures::interval_tree::IntervalTree;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};
use tracing::{debug, debug_span, warn};

use crate::domain::{BookingIssue, Evaluation, RangeViolation};

use super::{ReservationConflict, TimeOfDay, MINUTES_PER_DAY};

/// 枠の状態
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SlotStatus {
    /// 予約可能
    Available,
    /// 開始時刻を過ぎている
    Past,
    /// 既存の予約と重なる
    Conflict,
}

#[serde_as]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    #[serde_as(as = "DisplayFromStr")]
    pub start: TimeOfDay,
    pub status: SlotStatus,
}

/// 空き枠の問い合わせ
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotQuery {
    pub date: NaiveDate,
    /// `date` が今日の場合だけ現在時刻を渡す
    pub now_if_today: Option<TimeOfDay>,
    pub duration_hours: i64,
    pub candidate_starts: Vec<TimeOfDay>,
}

/// 候補の開始時刻ごとに状態を判定する
///
/// 判定は「過去」「重複」「予約可能」の順で最初に一致したものになる。
/// 結果の並びは候補の並びと同じ。1日の範囲外の開始時刻は結果に含めず、
/// エラー診断として報告する。日付をまたぐ枠は名目上の終了時刻のまま判定し、
/// 警告を付ける。
pub fn evaluate_slots(
    query: &SlotQuery,
    conflicts: &[ReservationConflict],
) -> Evaluation<Vec<SlotAvailability>> {
    let span = debug_span!("evaluate_slots", date = %query.date, hours = query.duration_hours);
    let _enter = span.enter();

    if query.duration_hours < 1 {
        let issue = BookingIssue::InvalidDuration {
            hours: query.duration_hours,
        };
        warn!(%issue, "rejecting slot evaluation");
        return Evaluation::new(Vec::new(), vec![issue]);
    }

    let mut booked = IntervalTree::new();
    for conflict in conflicts {
        booked.insert(conflict.range(), *conflict);
    }

    let mut slots = Vec::with_capacity(query.candidate_starts.len());
    let mut issues = Vec::new();
    for &start in &query.candidate_starts {
        if !start.is_within_day() {
            warn!(%start, "skipping candidate outside the day");
            issues.push(BookingIssue::OutOfRangeTime {
                minutes: start.minutes(),
                reason: RangeViolation::StartOutsideDay,
            });
            continue;
        }

        let end = start.plus_hours(query.duration_hours);
        if end.minutes() > MINUTES_PER_DAY {
            issues.push(BookingIssue::OutOfRangeTime {
                minutes: end.minutes(),
                reason: RangeViolation::EndPastMidnight,
            });
        }

        let window = start.minutes()..end.minutes();
        let status = match query.now_if_today {
            Some(now) if start <= now => SlotStatus::Past,
            _ if booked
                .find(window.clone())
                .any(|entry| entry.data().overlaps_range(&window)) =>
            {
                SlotStatus::Conflict
            }
            _ => SlotStatus::Available,
        };
        slots.push(SlotAvailability { start, status });
    }

    debug!(
        candidates = query.candidate_starts.len(),
        conflicts = conflicts.len(),
        "evaluated slots"
    );
    Evaluation::new(slots, issues)
}

/// 日付が今日であれば現在の時刻を返す
pub fn now_if_today(date: NaiveDate, now: NaiveDateTime) -> Option<TimeOfDay> {
    (now.date() == date).then(|| TimeOfDay::from(now.time()))
}
