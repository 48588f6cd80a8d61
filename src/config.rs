use crate::error::{Result, TrackerError};
use job_tracker_common::{SectionVisibility, SortDirection, SortField, SortState, Status};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データファイルの上書き指定
pub const DATA_FILE_ENV: &str = "JOB_TRACKER_DATA";

const DATA_FILE_NAME: &str = "job_tracker_data.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data_file: Option<PathBuf>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// 不採用セクションを最初から展開する
    pub expanded_rejected: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TrackerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("job-tracker").join("config.json"))
    }

    /// 応募データの保存先
    pub fn data_path(&self) -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(DATA_FILE_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }

        let base = dirs::data_dir()
            .ok_or_else(|| TrackerError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("job-tracker").join(DATA_FILE_NAME))
    }

    pub fn set_data_file(&mut self, path: PathBuf) -> Result<()> {
        self.data_file = Some(path);
        self.save()
    }

    pub fn initial_sort(&self) -> SortState {
        SortState::new(self.sort_field, self.sort_direction)
    }

    pub fn initial_visibility(&self) -> SectionVisibility {
        let mut visibility = SectionVisibility::default();
        if self.expanded_rejected {
            visibility.set_collapsed(Status::Rejected, false);
        }
        visibility
    }
}
