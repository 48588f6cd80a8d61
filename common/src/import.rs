//! インポートエンジン
//!
//! CSVテキストとJSONバックアップをレコードに変換し、既存ストアへマージする。
//!
//! - CSV: 1行目はヘッダとして無視。列位置は固定
//!   `role, company, status, date, (予備), notes`
//!   会社名+職種が既存と一致する行はスキップ
//! - JSON: レコード配列。既存IDと一致するものはスキップ
//!
//! JSONは全件を解釈し終えてからストアを変更する。保存に失敗した場合は
//! 取り込み前の状態に戻すので、失敗した取り込みがストアに残ることはない。

use crate::error::{Error, Result};
use crate::status::apply_auto_reject;
use crate::store::RecordStore;
use crate::types::{FollowUp, JobRecord, Status};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, info, warn};

const COL_ROLE: usize = 0;
const COL_COMPANY: usize = 1;
const COL_STATUS: usize = 2;
const COL_DATE: usize = 3;
const COL_NOTES: usize = 5;

/// 取り込み結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// 実際に追加した件数（重複除外後）
    pub added: usize,
    /// 重複・列不足でスキップした件数
    pub skipped: usize,
    /// 取り込み後の自動不採用で遷移した件数
    pub auto_rejected: usize,
}

/// CSVの1データ行（正規化前）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    /// ヘッダを0とした行番号
    pub line_index: usize,
    pub role: String,
    pub company: String,
    pub status: String,
    pub date: String,
    pub notes: String,
}

/// CSVテキストをデータ行に分解
///
/// 1行ずつ独立に分割する。引用符内のカンマは区切りとして扱わない。
/// 各フィールドは前後の空白と囲みの引用符を取り除く。列が2未満の行は捨てる。
pub fn parse_csv_rows(text: &str) -> Vec<CsvRow> {
    read_csv(text).0
}

/// データ行と、読み捨てた行数
fn read_csv(text: &str) -> (Vec<CsvRow>, usize) {
    let mut rows = Vec::new();
    let mut dropped = 0;

    for (line_index, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_line(line, line_index);
        if fields.len() < 2 {
            debug!(line = line_index, "skipping CSV row with fewer than 2 columns");
            dropped += 1;
            continue;
        }

        let field = |col: usize| fields.get(col).cloned().unwrap_or_default();

        rows.push(CsvRow {
            line_index,
            role: field(COL_ROLE),
            company: field(COL_COMPANY),
            status: field(COL_STATUS),
            date: field(COL_DATE),
            notes: field(COL_NOTES),
        });
    }

    (rows, dropped)
}

/// 1行をフィールドに分割
///
/// 行ごとにリーダーを作るので、閉じていない引用符は行末で終わる。
fn split_line(line: &str, line_index: usize) -> Vec<String> {
    let line = drop_space_before_quotes(line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(clean_field).collect(),
        Some(Err(e)) => {
            warn!("skipping unreadable CSV row {}: {}", line_index, e);
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// フィールド先頭の空白を、直後が引用符のときだけ取り除く
///
/// `a, "b,c"`の`"b,c"`を引用符付きフィールドとして読ませるため。
/// 引用符付きフィールド内の文字には触れない。
fn drop_space_before_quotes(line: &str) -> Cow<'_, str> {
    if !line.contains('"') {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut pending = String::new();
    let mut at_field_start = true;
    let mut quoted = false;
    let mut in_quotes = false;

    for c in line.chars() {
        if at_field_start {
            if c == ' ' || c == '\t' {
                pending.push(c);
                continue;
            }
            at_field_start = false;
            quoted = c == '"';
            if quoted {
                in_quotes = true;
                pending.clear();
                out.push(c);
                continue;
            }
            out.push_str(&pending);
            pending.clear();
        }

        match c {
            '"' if quoted => in_quotes = !in_quotes,
            ',' if !in_quotes => at_field_start = true,
            _ => {}
        }
        out.push(c);
    }
    out.push_str(&pending);

    Cow::Owned(out)
}

/// 囲みの引用符と前後の空白を除去
fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.trim().to_string()
}

/// ステータスの正規化
///
/// `Ongoing`はApplied扱い。語彙外の値はすべてResearchedにする。
pub fn normalize_status(raw: &str) -> Status {
    let mapped = if raw == "Ongoing" { "Applied" } else { raw };
    mapped.parse().unwrap_or(Status::Researched)
}

/// 日付の正規化
///
/// `DD/MM/YYYY`は`YYYY-MM-DD`に書き換える。`/`を含まない値はそのまま。
/// 空なら今日の日付。
pub fn normalize_date(raw: &str, today: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return today.to_string();
    }
    if !raw.contains('/') {
        return raw.to_string();
    }

    let parts: Vec<&str> = raw.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [day, month, year] => format!("{}-{}-{}", year, pad2(month), pad2(day)),
        _ => raw.to_string(),
    }
}

fn pad2(part: &str) -> String {
    if part.len() == 1 && part.chars().all(|c| c.is_ascii_digit()) {
        format!("0{}", part)
    } else {
        part.to_string()
    }
}

/// CSVを取り込む
pub fn import_csv(store: &mut RecordStore, text: &str, now: DateTime<Utc>) -> Result<ImportReport> {
    let (rows, dropped) = read_csv(text);
    let today = now.date_naive().format("%Y-%m-%d").to_string();
    let now_ms = now.timestamp_millis();

    let mut report = ImportReport {
        skipped: dropped,
        ..Default::default()
    };
    let checkpoint = store.checkpoint();

    for row in rows {
        if store.contains_pair(&row.company, &row.role) {
            debug!(company = %row.company, role = %row.role, "skipping duplicate CSV row");
            report.skipped += 1;
            continue;
        }

        let id = store.next_id(now_ms + row.line_index as i64);
        store.push(JobRecord {
            id,
            company: row.company,
            role: row.role,
            date: normalize_date(&row.date, &today),
            status: normalize_status(&row.status),
            follow_up: FollowUp::Pending,
            notes: row.notes,
            link: None,
        });
        report.added += 1;
    }

    report.auto_rejected = apply_auto_reject(store.records_mut(), now);
    store.commit(checkpoint)?;

    info!(
        added = report.added,
        skipped = report.skipped,
        auto_rejected = report.auto_rejected,
        "CSV import finished"
    );
    Ok(report)
}

/// JSONバックアップを解釈
///
/// 構文エラーは`Error::Parse`、配列でない・レコード形でない要素を含む場合は
/// `Error::InvalidFormat`。
pub fn parse_backup(text: &str) -> Result<Vec<JobRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::Parse(e.to_string()))?;

    if !value.is_array() {
        return Err(Error::InvalidFormat(
            "backup must be a JSON array of job records".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| Error::InvalidFormat(e.to_string()))
}

/// JSONバックアップを取り込む
pub fn import_json(store: &mut RecordStore, text: &str, now: DateTime<Utc>) -> Result<ImportReport> {
    let incoming = parse_backup(text)?;
    let mut report = ImportReport::default();
    let checkpoint = store.checkpoint();

    for record in incoming {
        if store.contains_id(record.id) {
            debug!(id = record.id, "skipping backup record with existing id");
            report.skipped += 1;
            continue;
        }
        store.push(record);
        report.added += 1;
    }

    report.auto_rejected = apply_auto_reject(store.records_mut(), now);
    store.commit(checkpoint)?;

    info!(
        added = report.added,
        skipped = report.skipped,
        auto_rejected = report.auto_rejected,
        "backup import finished"
    );
    Ok(report)
}
