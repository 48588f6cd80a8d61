//! ファイル保存スロット
//!
//! 応募データ全件をJSONファイル1つに保存する。
//! ファイルがなければ未保存として扱う。それ以外の読み込み失敗はエラー。

use job_tracker_common::{Error, Slot};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn read(&self) -> job_tracker_common::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("データファイルを読み込めません {}: {}", self.path.display(), e);
                Err(Error::Storage(format!("{}: {}", self.path.display(), e)))
            }
        }
    }

    fn write(&mut self, data: &str) -> job_tracker_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // 一時ファイルに書いてから置き換える
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
