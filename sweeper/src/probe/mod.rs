//! プローブ
//!
//! 1インスタンスに対する時間制限付きのリモートチェック

pub mod catalog;
pub mod health;
pub mod metrics;

pub use health::HealthProbe;
pub use metrics::MetricsProbe;

use crate::common::config::SweepConfig;
use crate::common::error::ProbeError;
use crate::common::types::{CheckResult, Instance};
use async_trait::async_trait;
use reqwest::Client;

/// オーケストレーターが呼び出すプローブ
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    /// HTTP到達性チェック
    ///
    /// 失敗は常に `success = false` の結果として返す。
    async fn check_health(&self, instance: &Instance) -> CheckResult;

    /// メトリクスのバッチ読み取り
    ///
    /// 成功時は `CheckKind::METRICS` の各種別について1件ずつ結果を返す。
    /// バッチ全体が失敗した場合は `Err` を返す。
    async fn check_metrics(&self, instance: &Instance) -> Result<Vec<CheckResult>, ProbeError>;
}

/// HTTP経由の実プローブ
#[derive(Clone)]
pub struct HttpProbe {
    health: HealthProbe,
    metrics: MetricsProbe,
}

impl HttpProbe {
    /// 新しいプローブを作成
    ///
    /// `client` の接続プールは全タスクで共有される。
    pub fn new(client: Client, config: &SweepConfig) -> Self {
        Self {
            health: HealthProbe::new(client.clone(), config.health_timeout()),
            metrics: MetricsProbe::new(
                client,
                config.metrics_proxy_url.clone(),
                config.metrics_timeout(),
            ),
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check_health(&self, instance: &Instance) -> CheckResult {
        self.health.check(instance).await
    }

    async fn check_metrics(&self, instance: &Instance) -> Result<Vec<CheckResult>, ProbeError> {
        self.metrics.check(instance).await
    }
}
