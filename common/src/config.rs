//! 設定管理
//!
//! スイープ設定（起動時に一度だけ構築し、実行中は変更しない）

use crate::error::SweepError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 管理ポータルのインスタンスディレクトリURL
pub const DEFAULT_DIRECTORY_URL: &str = "https://admin.longsight.com/longsight/json/jmx-instances";

/// 管理ポータルのヘルス情報受信URL
pub const DEFAULT_REPORT_URL: &str = "https://admin.longsight.com/longsight/healthinfo";

/// メトリクスプロキシ（Jolokia）URL
pub const DEFAULT_METRICS_PROXY_URL: &str = "http://10.4.100.101:32222/jolokia";

/// ポータルに送るクライアント識別子
pub const DEFAULT_USER_AGENT: &str = "JMX-Cron v1.0";

/// スイープ設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// インスタンスディレクトリURL
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// レポート送信先URL
    #[serde(default = "default_report_url")]
    pub report_url: String,

    /// メトリクスプロキシURL
    #[serde(default = "default_metrics_proxy_url")]
    pub metrics_proxy_url: String,

    /// Bearerトークン（必須）
    #[serde(default)]
    pub token: String,

    /// 対象IPの絞り込み（カンマ区切り）
    #[serde(default)]
    pub ip_filter: Option<String>,

    /// クライアント（テナント）ID
    #[serde(default)]
    pub client_id: Option<String>,

    /// User-Agentヘッダー
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// ヘルスプローブのタイムアウト（秒）(デフォルト: 7)
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,

    /// メトリクスプローブのタイムアウト（秒）(デフォルト: 3)
    #[serde(default = "default_metrics_timeout")]
    pub metrics_timeout_secs: u64,

    /// スイープ全体の期限（秒）(デフォルト: 30)
    #[serde(default = "default_sweep_deadline")]
    pub sweep_deadline_secs: u64,

    /// レポートを送信せず標準出力に書き出す
    #[serde(default)]
    pub dry_run: bool,
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_report_url() -> String {
    DEFAULT_REPORT_URL.to_string()
}

fn default_metrics_proxy_url() -> String {
    DEFAULT_METRICS_PROXY_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_health_timeout() -> u64 {
    7
}

fn default_metrics_timeout() -> u64 {
    3
}

fn default_sweep_deadline() -> u64 {
    30
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            directory_url: default_directory_url(),
            report_url: default_report_url(),
            metrics_proxy_url: default_metrics_proxy_url(),
            token: String::new(),
            ip_filter: None,
            client_id: None,
            user_agent: default_user_agent(),
            health_timeout_secs: default_health_timeout(),
            metrics_timeout_secs: default_metrics_timeout(),
            sweep_deadline_secs: default_sweep_deadline(),
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// 設定を検証
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.token.trim().is_empty() {
            return Err(SweepError::Config(
                "Please provide a valid security token".to_string(),
            ));
        }
        if self.health_timeout_secs == 0 || self.metrics_timeout_secs == 0 {
            return Err(SweepError::Config(
                "Probe timeouts must be at least 1 second".to_string(),
            ));
        }
        if self.sweep_deadline_secs == 0 {
            return Err(SweepError::Config(
                "Sweep deadline must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// ヘルスプローブのタイムアウト
    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    /// メトリクスプローブのタイムアウト
    pub fn metrics_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics_timeout_secs)
    }

    /// スイープ全体の期限
    pub fn sweep_deadline(&self) -> Duration {
        Duration::from_secs(self.sweep_deadline_secs)
    }
}
