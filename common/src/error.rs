//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// バックアップJSONの構文エラー
    #[error("Parse error: {0}")]
    Parse(String),

    /// 構文は正しいがレコード配列ではない
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
