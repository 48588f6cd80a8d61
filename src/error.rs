use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("対応していない形式です: {0}（csv または json を指定してください）")]
    UnsupportedFormat(String),

    #[error("操作を中止しました")]
    Cancelled,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] job_tracker_common::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
