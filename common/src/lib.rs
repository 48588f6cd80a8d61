//! Job Tracker Common Library
//!
//! 応募記録のデータ層: レコードモデル、ステータスの自動遷移、
//! 集計・並べ替え、CSV/JSONの取り込み。表示層からは`Tracker`経由で使う。

pub mod types;
pub mod error;
pub mod status;
pub mod store;
pub mod views;
pub mod import;
pub mod controller;

pub use types::{FollowUp, JobRecord, NewRecord, RecordPatch, Status};
pub use error::{Error, Result};
pub use status::{Clock, FixedClock, SystemClock, AUTO_REJECT_MARKER};
pub use store::{MemorySlot, RecordStore, Slot};
pub use views::{CategoryView, SectionVisibility, SortDirection, SortField, SortState, Stats};
pub use import::ImportReport;
pub use controller::{Action, ExportFile, Outcome, Snapshot, Tracker, EXPORT_FILE_NAME};
