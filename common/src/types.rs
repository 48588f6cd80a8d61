//! 応募レコードの型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - JobRecord: 永続化される応募1件
//! - Status / FollowUp: 閉じた語彙
//! - NewRecord / RecordPatch: 作成・部分更新の入力

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 応募ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Researched,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl Status {
    /// 全ステータス（宣言順）
    pub const ALL: [Status; 5] = [
        Status::Researched,
        Status::Applied,
        Status::Interview,
        Status::Offer,
        Status::Rejected,
    ];

    /// カテゴリ表示順（優先度順、件数やアルファベット順ではない）
    pub const DISPLAY_ORDER: [Status; 5] = [
        Status::Researched,
        Status::Offer,
        Status::Interview,
        Status::Applied,
        Status::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Researched => "Researched",
            Status::Applied => "Applied",
            Status::Interview => "Interview",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
        }
    }

    /// 面接以降に進んだか（応答率の分子）
    pub fn is_response(&self) -> bool {
        matches!(self, Status::Interview | Status::Offer)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown status: {}. Use Researched, Applied, Interview, Offer, or Rejected",
                    s
                )
            })
    }
}

/// フォローアップ状態（ステータスとは独立）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FollowUp {
    #[default]
    Pending,
    Sent,
    Done,
}

impl FollowUp {
    pub const ALL: [FollowUp; 3] = [FollowUp::Pending, FollowUp::Sent, FollowUp::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUp::Pending => "Pending",
            FollowUp::Sent => "Sent",
            FollowUp::Done => "Done",
        }
    }
}

impl fmt::Display for FollowUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FollowUp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FollowUp::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown follow-up: {}. Use Pending, Sent, or Done", s))
    }
}

/// 応募1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// 作成時刻由来の一意ID（作成後は不変）
    pub id: i64,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub role: String,

    /// YYYY-MM-DD
    #[serde(default)]
    pub date: String,

    pub status: Status,

    #[serde(default)]
    pub follow_up: FollowUp,

    #[serde(default)]
    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// 入力フォームから作る新規レコード（IDは未割当）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub company: String,
    pub role: String,
    /// 空なら作成日
    pub date: String,
    pub status: Status,
    pub notes: String,
    pub link: Option<String>,
}

impl NewRecord {
    /// IDと既定日付を与えてJobRecordにする
    pub fn into_record(self, id: i64, today: &str) -> JobRecord {
        let date = if self.date.trim().is_empty() {
            today.to_string()
        } else {
            self.date.trim().to_string()
        };

        JobRecord {
            id,
            company: self.company.trim().to_string(),
            role: self.role.trim().to_string(),
            date,
            status: self.status,
            follow_up: FollowUp::Pending,
            notes: self.notes,
            link: self.link.filter(|l| !l.trim().is_empty()),
        }
    }
}

/// 部分更新（ステータス・フォローアップ・メモのみ変更可能）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub status: Option<Status>,
    pub follow_up: Option<FollowUp>,
    pub notes: Option<String>,
}

impl RecordPatch {
    pub fn status(status: Status) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn follow_up(follow_up: FollowUp) -> Self {
        Self { follow_up: Some(follow_up), ..Default::default() }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self { notes: Some(notes.into()), ..Default::default() }
    }

    /// レコードに適用
    pub fn apply(self, record: &mut JobRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(follow_up) = self.follow_up {
            record.follow_up = follow_up;
        }
        if let Some(notes) = self.notes {
            record.notes = notes;
        }
    }
}
