//! ステータスエンジン
//!
//! 時間経過による自動遷移（Applied → Rejected）と日付の解釈を扱う。
//! 現在時刻は`Clock`経由で受け取り、テストでは固定時刻を使う。

use crate::types::{JobRecord, Status};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

/// 自動不採用までの日数（これを超えたら遷移）
pub const AUTO_REJECT_AFTER_DAYS: i64 = 21;

/// 自動不採用時にメモへ追記する行
pub const AUTO_REJECT_MARKER: &str = "[Auto-Rejected: >21 days silence]";

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 現在時刻の供給元
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// YYYY-MM-DD形式の今日
    fn today(&self) -> String {
        self.now().date_naive().format("%Y-%m-%d").to_string()
    }
}

/// システム時計
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 固定時刻（テスト・再現用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 日付文字列を時刻に変換
///
/// `YYYY-MM-DD`はUTCの0時として扱う。RFC 3339の日時も受け付ける。
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let trimmed = date.trim();
    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 経過日数（端数切り上げ、前後どちらでも絶対値）
pub fn age_in_days(date: &str, now: DateTime<Utc>) -> Option<i64> {
    let then = parse_date(date)?;
    let diff_ms = (now - then).num_milliseconds().abs();
    Some((diff_ms + DAY_MS - 1) / DAY_MS)
}

/// 自動不採用の対象か
///
/// ステータスがAppliedのときだけ判定するため、既にRejectedのレコードには
/// 二度と発火しない。
pub fn should_auto_reject(record: &JobRecord, now: DateTime<Utc>) -> bool {
    record.status == Status::Applied
        && age_in_days(&record.date, now).is_some_and(|age| age > AUTO_REJECT_AFTER_DAYS)
}

/// 全レコードに自動不採用ルールを適用し、遷移した件数を返す
pub fn apply_auto_reject(records: &mut [JobRecord], now: DateTime<Utc>) -> usize {
    let mut changed = 0;

    for record in records.iter_mut() {
        if !should_auto_reject(record, now) {
            continue;
        }

        record.status = Status::Rejected;
        if record.notes.is_empty() {
            record.notes = AUTO_REJECT_MARKER.to_string();
        } else {
            record.notes = format!("{}\n{}", record.notes, AUTO_REJECT_MARKER);
        }
        changed += 1;

        info!(id = record.id, company = %record.company, "auto-rejected after silence");
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FollowUp;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn applied_days_ago(days: i64, notes: &str) -> JobRecord {
        let date = (noon() - Duration::days(days)).date_naive();
        JobRecord {
            id: days,
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            status: Status::Applied,
            follow_up: FollowUp::Pending,
            notes: notes.to_string(),
            link: None,
        }
    }

    #[test]
    fn test_parse_date_iso() {
        let parsed = parse_date("2024-03-15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("").is_none());
        assert!(parse_date("15/03/2024").is_none());
        assert!(parse_date("someday").is_none());
    }

    #[test]
    fn test_age_rounds_up_partial_days() {
        // 20日と12時間 → 21日
        assert_eq!(age_in_days("2024-06-10", noon()), Some(21));
        // 未来日付も絶対値
        assert_eq!(age_in_days("2024-07-02", noon()), Some(2));
    }

    #[test]
    fn test_auto_reject_after_22_days() {
        let mut records = vec![applied_days_ago(22, "")];
        let changed = apply_auto_reject(&mut records, noon());

        assert_eq!(changed, 1);
        assert_eq!(records[0].status, Status::Rejected);
        assert_eq!(records[0].notes.matches(AUTO_REJECT_MARKER).count(), 1);
    }

    #[test]
    fn test_auto_reject_keeps_20_days() {
        let mut records = vec![applied_days_ago(20, "")];
        assert_eq!(apply_auto_reject(&mut records, noon()), 0);
        assert_eq!(records[0].status, Status::Applied);
        assert_eq!(records[0].notes, "");
    }

    #[test]
    fn test_auto_reject_appends_to_existing_notes() {
        let mut records = vec![applied_days_ago(40, "phone screen\nno reply")];
        apply_auto_reject(&mut records, noon());
        assert_eq!(
            records[0].notes,
            format!("phone screen\nno reply\n{}", AUTO_REJECT_MARKER)
        );
    }

    #[test]
    fn test_auto_reject_is_idempotent() {
        let mut records = vec![applied_days_ago(30, "")];
        apply_auto_reject(&mut records, noon());
        let changed = apply_auto_reject(&mut records, noon());

        assert_eq!(changed, 0);
        assert_eq!(records[0].notes.matches(AUTO_REJECT_MARKER).count(), 1);
    }

    #[test]
    fn test_auto_reject_ignores_other_statuses() {
        let mut interview = applied_days_ago(60, "");
        interview.status = Status::Interview;
        let mut researched = applied_days_ago(60, "");
        researched.status = Status::Researched;
        let mut records = vec![interview, researched];

        assert_eq!(apply_auto_reject(&mut records, noon()), 0);
        assert_eq!(records[0].status, Status::Interview);
        assert_eq!(records[1].status, Status::Researched);
    }

    #[test]
    fn test_auto_reject_skips_unparsable_date() {
        let mut record = applied_days_ago(60, "");
        record.date = "sometime last year".to_string();
        let mut records = vec![record];

        assert_eq!(apply_auto_reject(&mut records, noon()), 0);
        assert_eq!(records[0].status, Status::Applied);
    }

    #[test]
    fn test_fixed_clock_today() {
        assert_eq!(FixedClock(noon()).today(), "2024-06-30");
    }
}
