//! コントローラ
//!
//! レコードストア・並べ替え条件・セクション開閉状態を1つの状態オブジェクトに
//! まとめ、表示層からの操作を`dispatch`で受け付ける。
//! 状態が変わるたびに登録済みリスナーへ最新のスナップショットを通知する。

use crate::views::{
    compute_stats, group_by_status, CategoryView, SectionVisibility, SortField, SortState, Stats,
};
use crate::error::Result;
use crate::import::{import_csv, import_json, ImportReport};
use crate::status::{apply_auto_reject, Clock, SystemClock};
use crate::store::{RecordStore, Slot};
use crate::types::{FollowUp, JobRecord, NewRecord, RecordPatch, Status};
use serde::Serialize;
use tracing::{debug, info};

/// エクスポートファイル名
pub const EXPORT_FILE_NAME: &str = "job_tracker_backup.json";

/// 表示層からの操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create(NewRecord),
    /// 確認は表示層の責務
    Delete { id: i64 },
    UpdateStatus { id: i64, status: Status },
    UpdateFollowUp { id: i64, follow_up: FollowUp },
    UpdateNotes { id: i64, notes: String },
    SetSort(SortField),
    ToggleSection(Status),
    ImportCsv(String),
    ImportJson(String),
    Export,
}

/// 操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 作成されたレコードのID
    Created(i64),
    /// 更新・削除の結果（対象IDがなければfalse）
    Applied(bool),
    /// 表示状態の変更
    ViewChanged,
    Imported(ImportReport),
    Exported(ExportFile),
}

/// ダウンロード用のバックアップ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// 再描画に必要な全情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub records: Vec<JobRecord>,
    pub stats: Stats,
    pub sort: SortState,
    pub sections: Vec<CategoryView>,
}

type Listener = Box<dyn FnMut(&Snapshot)>;

/// 応募トラッカーの状態オブジェクト
pub struct Tracker {
    store: RecordStore,
    sort: SortState,
    visibility: SectionVisibility,
    clock: Box<dyn Clock>,
    listeners: Vec<Listener>,
}

impl Tracker {
    /// システム時計で開く
    pub fn open(slot: Box<dyn Slot>) -> Result<Self> {
        Self::open_with_clock(slot, Box::new(SystemClock))
    }

    /// スロットから読み込み、自動不採用ルールを適用する
    pub fn open_with_clock(slot: Box<dyn Slot>, clock: Box<dyn Clock>) -> Result<Self> {
        let mut store = RecordStore::load(slot)?;

        let rejected = apply_auto_reject(store.records_mut(), clock.now());
        if rejected > 0 {
            info!(count = rejected, "auto-rejected stale applications on load");
            store.persist()?;
        }

        Ok(Self {
            store,
            sort: SortState::default(),
            visibility: SectionVisibility::default(),
            clock,
            listeners: Vec::new(),
        })
    }

    /// 初期の並べ替え条件を指定
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    /// 初期のセクション開閉状態を指定
    pub fn with_visibility(mut self, visibility: SectionVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// 再描画リスナーを登録
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn records(&self) -> &[JobRecord] {
        self.store.records()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn visibility(&self) -> &SectionVisibility {
        &self.visibility
    }

    pub fn stats(&self) -> Stats {
        compute_stats(self.store.records())
    }

    pub fn snapshot(&self) -> Snapshot {
        let records = self.store.records();
        Snapshot {
            records: records.to_vec(),
            stats: compute_stats(records),
            sort: self.sort,
            sections: group_by_status(records, self.sort, &self.visibility),
        }
    }

    /// 全件をバックアップJSONにする
    pub fn export(&self) -> Result<ExportFile> {
        let contents = serde_json::to_string_pretty(self.store.records())?;
        Ok(ExportFile {
            file_name: EXPORT_FILE_NAME.to_string(),
            contents,
        })
    }

    /// 操作を1件処理する
    ///
    /// 変更系の操作はストアを保存してから戻る。状態が変わった場合のみ
    /// リスナーへ通知する。
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        debug!(?action, "dispatch");

        let outcome = match action {
            Action::Create(new_record) => {
                let now = self.clock.now();
                let id = self.store.next_id(now.timestamp_millis());
                let record = new_record.into_record(id, &self.clock.today());
                self.store.add(record)?;
                Outcome::Created(id)
            }
            Action::Delete { id } => Outcome::Applied(self.store.remove(id)?),
            Action::UpdateStatus { id, status } => {
                Outcome::Applied(self.store.update(id, RecordPatch::status(status))?)
            }
            Action::UpdateFollowUp { id, follow_up } => {
                Outcome::Applied(self.store.update(id, RecordPatch::follow_up(follow_up))?)
            }
            Action::UpdateNotes { id, notes } => {
                Outcome::Applied(self.store.update(id, RecordPatch::notes(notes))?)
            }
            Action::SetSort(field) => {
                self.sort.select(field);
                Outcome::ViewChanged
            }
            Action::ToggleSection(status) => {
                self.visibility.toggle(status);
                Outcome::ViewChanged
            }
            Action::ImportCsv(text) => {
                Outcome::Imported(import_csv(&mut self.store, &text, self.clock.now())?)
            }
            Action::ImportJson(text) => {
                Outcome::Imported(import_json(&mut self.store, &text, self.clock.now())?)
            }
            Action::Export => return Ok(Outcome::Exported(self.export()?)),
        };

        if outcome != Outcome::Applied(false) {
            self.notify();
        }
        Ok(outcome)
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("store", &self.store)
            .field("sort", &self.sort)
            .field("visibility", &self.visibility)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
