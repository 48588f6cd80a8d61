//! 端末向けの表示
//!
//! スナップショットを文字列に整形する。カテゴリは固定の表示順で並び、
//! 折りたたまれたカテゴリは件数のみ表示する。

use job_tracker_common::{CategoryView, JobRecord, Snapshot, Stats};

const COMPANY_WIDTH: usize = 20;
const ROLE_WIDTH: usize = 24;

/// 集計行
pub fn render_stats(stats: &Stats) -> String {
    format!(
        "応募数: {}  面接: {}  内定: {}  不採用: {}  応答率: {}%",
        stats.total, stats.interviews, stats.offers, stats.rejected, stats.response_rate
    )
}

/// 画面全体
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    out.push_str(&render_stats(&snapshot.stats));
    out.push('\n');
    out.push_str(&format!(
        "並べ替え: {} ({})\n",
        snapshot.sort.field, snapshot.sort.direction
    ));

    for section in &snapshot.sections {
        out.push('\n');
        out.push_str(&render_section(section));
    }
    out
}

fn render_section(section: &CategoryView) -> String {
    let mut out = String::new();

    if section.collapsed {
        out.push_str(&format!("▶ {} ({})\n", section.status, section.len()));
        return out;
    }

    out.push_str(&format!("▼ {} ({})\n", section.status, section.len()));
    if section.is_empty() {
        out.push_str("  （なし）\n");
        return out;
    }

    out.push_str(&format!(
        "  {:<14} {:<cw$} {:<rw$} {:<10} {:<8}\n",
        "ID",
        "会社",
        "職種",
        "日付",
        "フォロー",
        cw = COMPANY_WIDTH,
        rw = ROLE_WIDTH
    ));
    for record in &section.records {
        out.push_str(&render_row(record));
    }
    out
}

fn render_row(record: &JobRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<14} {:<cw$} {:<rw$} {:<10} {:<8}\n",
        record.id,
        truncate(&record.company, COMPANY_WIDTH),
        truncate(&record.role, ROLE_WIDTH),
        record.date,
        record.follow_up,
        cw = COMPANY_WIDTH,
        rw = ROLE_WIDTH
    ));
    if let Some(link) = record.link.as_deref().filter(|l| !l.is_empty()) {
        out.push_str(&format!("      {}\n", link));
    }
    for line in record.notes.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str(&format!("      - {}\n", line));
    }
    out
}

/// 表示幅に収める（文字数基準）
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
