//! job-tracker: 求人応募の記録・集計ツール（CLI）
//!
//! データ層は`job_tracker_common`。このクレートは端末向けの表示層と
//! 設定・保存先・ログを受け持つ。

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod storage;

use config::Config;
use error::Result;
use job_tracker_common::Tracker;
use std::path::{Path, PathBuf};
use storage::FileSlot;

/// 保存先を決める（引数 > 環境変数 > 設定 > 既定）
pub fn resolve_data_path(explicit: Option<&Path>, config: &Config) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config.data_path(),
    }
}

/// 設定を反映したトラッカーを開く
pub fn open_tracker(data_path: &Path, config: &Config) -> Result<Tracker> {
    let tracker = Tracker::open(Box::new(FileSlot::new(data_path)))?
        .with_sort(config.initial_sort())
        .with_visibility(config.initial_visibility());
    Ok(tracker)
}
