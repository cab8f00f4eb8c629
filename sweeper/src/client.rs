//! 共有HTTPクライアント
//!
//! 全プローブ・ディレクトリ・レポート送信で1つの接続プールを共有する。

use crate::common::error::{ProbeError, SweepError, SweepResult};
use reqwest::Client;
use std::error::Error as _;
use std::time::Duration;

/// アイドル接続を保持する時間（秒）
const POOL_IDLE_TIMEOUT_SECS: u64 = 30;

/// 共有HTTPクライアントを作成
///
/// タイムアウトはリクエストごとに設定するため、ここでは指定しない。
pub fn build_http_client() -> SweepResult<Client> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
        .build()
        .map_err(|e| SweepError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// reqwestのエラーをプローブエラーに分類
pub fn classify_error(error: &reqwest::Error, timeout: Duration) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout(timeout)
    } else if error.is_decode() {
        ProbeError::Decode(describe(error))
    } else {
        ProbeError::Transport(describe(error))
    }
}

/// エラーチェーン全体を1行にまとめる
///
/// reqwestの`Display`は原因（DNS失敗、接続拒否など）を含まないため。
pub fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
