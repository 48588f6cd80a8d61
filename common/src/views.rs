//! 集計・カテゴリ分け・並べ替え
//!
//! 現在のレコード列から表示用の値を導出する純粋関数群。
//! 並べ替え条件とセクションの開閉状態はコントローラが所有し、ここへ渡す。

use crate::status::parse_date;
use crate::types::{JobRecord, Status};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 集計値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    /// Interview + Offer
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    /// 0〜100（四捨五入）
    pub response_rate: u32,
}

/// 集計値を計算
pub fn compute_stats(records: &[JobRecord]) -> Stats {
    let total = records.len();
    let interviews = records.iter().filter(|r| r.status.is_response()).count();
    let offers = records.iter().filter(|r| r.status == Status::Offer).count();
    let rejected = records.iter().filter(|r| r.status == Status::Rejected).count();

    Stats {
        total,
        interviews,
        offers,
        rejected,
        response_rate: percentage(interviews, total),
    }
}

/// 四捨五入（0.5は切り上げ）のパーセント。分母0なら0
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part as u64 + whole as u64) / (2 * whole as u64);
    rounded.min(100) as u32
}

/// 並べ替え対象の列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Company,
    Role,
    #[default]
    Date,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "company" => Ok(SortField::Company),
            "role" => Ok(SortField::Role),
            "date" => Ok(SortField::Date),
            _ => Err(format!("Unknown sort field: {}. Use company, role, or date", s)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Company => write!(f, "company"),
            SortField::Role => write!(f, "role"),
            SortField::Date => write!(f, "date"),
        }
    }
}

/// 並べ替えの向き
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown direction: {}. Use asc or desc", s)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// 全カテゴリ共通の並べ替え条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// 列を選択する
    ///
    /// 同じ列なら向きを反転、別の列なら昇順から始める。
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, a: &JobRecord, b: &JobRecord) -> Ordering {
        let ordering = match self.field {
            SortField::Company => compare_text(&a.company, &b.company),
            SortField::Role => compare_text(&a.role, &b.role),
            SortField::Date => compare_dates(&a.date, &b.date),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// 大文字小文字を区別しない比較。同順位なら元の文字列で決める
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// 日付として比較。解釈できない日付は先頭（昇順時）に寄せる
fn compare_dates(a: &str, b: &str) -> Ordering {
    parse_date(a).cmp(&parse_date(b))
}

/// レコードを並べ替えたコピーを返す（安定ソート）
pub fn sorted(records: &[JobRecord], sort: SortState) -> Vec<JobRecord> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| sort.compare(a, b));
    out
}

/// セクションの開閉状態
///
/// Rejectedのみ初期状態で折りたたむ。永続化はしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionVisibility {
    collapsed: HashMap<Status, bool>,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        let collapsed = Status::ALL
            .into_iter()
            .map(|status| (status, status == Status::Rejected))
            .collect();
        Self { collapsed }
    }
}

impl SectionVisibility {
    /// 全セクション展開
    pub fn all_expanded() -> Self {
        let collapsed = Status::ALL.into_iter().map(|status| (status, false)).collect();
        Self { collapsed }
    }

    pub fn is_collapsed(&self, status: Status) -> bool {
        self.collapsed.get(&status).copied().unwrap_or(false)
    }

    pub fn set_collapsed(&mut self, status: Status, collapsed: bool) {
        self.collapsed.insert(status, collapsed);
    }

    /// 1セクションだけ開閉を切り替え、新しい状態を返す
    pub fn toggle(&mut self, status: Status) -> bool {
        let collapsed = !self.is_collapsed(status);
        self.set_collapsed(status, collapsed);
        collapsed
    }
}

/// 1カテゴリ分の表示データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub status: Status,
    pub collapsed: bool,
    pub records: Vec<JobRecord>,
}

impl CategoryView {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// ステータスごとに分けて並べ替える（カテゴリは固定の表示順）
pub fn group_by_status(
    records: &[JobRecord],
    sort: SortState,
    visibility: &SectionVisibility,
) -> Vec<CategoryView> {
    Status::DISPLAY_ORDER
        .into_iter()
        .map(|status| {
            let members: Vec<JobRecord> = records
                .iter()
                .filter(|r| r.status == status)
                .cloned()
                .collect();
            CategoryView {
                status,
                collapsed: visibility.is_collapsed(status),
                records: sorted(&members, sort),
            }
        })
        .collect()
}
