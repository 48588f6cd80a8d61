use clap::{Parser, Subcommand};
use job_tracker_common::{FollowUp, SortDirection, SortField, Status};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "job-tracker")]
#[command(about = "求人応募の記録・集計ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データファイル（設定・環境変数より優先）
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ステータス別に一覧表示
    List {
        /// 並べ替え列 (company/role/date)
        #[arg(short, long)]
        sort: Option<SortField>,

        /// 並べ替えの向き (asc/desc)
        #[arg(short, long)]
        direction: Option<SortDirection>,

        /// 開閉を切り替えるセクション（複数指定可）
        #[arg(short, long)]
        toggle: Vec<Status>,

        /// 全セクションを展開
        #[arg(short, long)]
        all: bool,
    },

    /// 集計のみ表示
    Stats,

    /// 応募を追加
    Add {
        /// 会社名
        #[arg(short, long, required = true)]
        company: String,

        /// 職種
        #[arg(short, long, required = true)]
        role: String,

        /// 応募日 YYYY-MM-DD（省略時は今日）
        #[arg(short, long)]
        date: Option<String>,

        /// ステータス
        #[arg(short, long, default_value = "Applied")]
        status: Status,

        /// 求人URL
        #[arg(short, long)]
        link: Option<String>,

        /// メモ
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// 応募を削除
    Rm {
        /// 応募ID
        id: i64,

        /// 確認を省略
        #[arg(short, long)]
        yes: bool,
    },

    /// ステータスを変更
    Status {
        /// 応募ID
        id: i64,

        /// 新しいステータス
        status: Status,
    },

    /// フォローアップ状態を変更
    FollowUp {
        /// 応募ID
        id: i64,

        /// Pending/Sent/Done
        follow_up: FollowUp,
    },

    /// メモを書き換え
    Notes {
        /// 応募ID
        id: i64,

        /// 新しいメモ（空文字で消去）
        notes: String,
    },

    /// CSV/JSONバックアップを取り込む
    Import {
        /// 入力ファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 形式 (csv/json)。省略時は拡張子で判定
        #[arg(short, long)]
        format: Option<ImportFormat>,
    },

    /// JSONバックアップを出力
    Export {
        /// 出力ディレクトリ（省略時はカレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// データファイルの保存先を設定
        #[arg(long)]
        set_data_file: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// 拡張子から判定
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl std::str::FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv or json", s)),
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportFormat::Csv => write!(f, "csv"),
            ImportFormat::Json => write!(f, "json"),
        }
    }
}
