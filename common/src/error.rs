//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! スイープ全体を中断する致命的エラー（`SweepError`）と、
//! 1プローブ内で回収されるエラー（`ProbeError`）を区別する。

use std::time::Duration;
use thiserror::Error;

/// スイープを中断する致命的エラー
#[derive(Debug, Error)]
pub enum SweepError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Instance directory lookup failed
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// Report sink rejected or could not receive the report
    #[error("Report delivery failed: {0}")]
    ReportDelivery(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 1プローブ内のエラー（失敗結果として回収される）
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// Request timed out
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or other transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// スイープ結果型
pub type SweepResult<T> = Result<T, SweepError>;
