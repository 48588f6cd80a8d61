//! ログ初期化
//!
//! RUST_LOGで上書き可能。既定はwarn、`--verbose`でdebug。
//! 表の出力と混ざらないよう標準エラーへ書く。

use tracing_subscriber::{fmt, EnvFilter};

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化は無視
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
