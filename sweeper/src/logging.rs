//! ロギング初期化ユーティリティ
//!
//! 標準エラー出力へのfmtレイヤーと、任意の日次ローテーションファイルレイヤー

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// ログレベルを指定する環境変数
pub const LOG_LEVEL_ENV: &str = "JMX_SWEEP_LOG_LEVEL";

/// ログファイル出力先を指定する環境変数
pub const LOG_DIR_ENV: &str = "JMX_SWEEP_LOG_DIR";

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "jmx-sweep";

/// デフォルトのログレベル
const DEFAULT_LOG_LEVEL: &str = "info";

/// ログフィルタ用のディレクティブを決定
///
/// `JMX_SWEEP_LOG_LEVEL` → `RUST_LOG` → `info` の順に参照する。
pub fn log_directive() -> String {
    [LOG_LEVEL_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// ログファイルの出力先ディレクトリ
pub fn log_dir() -> Option<PathBuf> {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_new(log_directive()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// ロギングを初期化
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file_layer = match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .build(dir)?;
            Some(fmt::layer().with_ansi(false).with_writer(appender))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()?;

    Ok(())
}
