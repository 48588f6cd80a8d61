//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use job_tracker::config::Config;
use job_tracker::error::TrackerError;
use tempfile::tempdir;

/// TrackerErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        TrackerError::Config("テスト設定エラー".to_string()),
        TrackerError::FileNotFound("jobs.csv".to_string()),
        TrackerError::UnsupportedFormat("jobs.txt".to_string()),
        TrackerError::Cancelled,
        TrackerError::Prompt("not a terminal".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: TrackerError = io_err.into();

    assert!(matches!(err, TrackerError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = job_tracker_common::Error::InvalidFormat("expected an array".to_string());
    let err: TrackerError = common_err.into();

    assert!(matches!(err, TrackerError::Common(_)));
    assert_eq!(format!("{}", err), "Invalid format: expected an array");
}

/// 設定ファイルがなければ既定値
#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert!(config.data_file.is_none());
    assert!(!config.expanded_rejected);
}

/// 設定の保存と再読み込み
#[test]
fn test_config_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("sub").join("config.json");
    let config = Config {
        data_file: Some(dir.path().join("jobs.json")),
        expanded_rejected: true,
        ..Default::default()
    };

    config.save_to(&path).expect("設定保存失敗");
    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded.data_file, config.data_file);
    assert!(loaded.expanded_rejected);
}

/// 壊れた設定ファイルはJSONエラー
#[test]
fn test_config_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ invalid }").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(TrackerError::JsonParse(_))));
}
