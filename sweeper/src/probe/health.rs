//! ヘルスプローブ
//!
//! インスタンスのHTTPポートにGETを送り、到達性とレイテンシを測定する

use crate::client::classify_error;
use crate::common::types::{CheckKind, CheckPayload, CheckResult, Instance};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// HTTP到達性プローブ
#[derive(Clone)]
pub struct HealthProbe {
    client: Client,
    timeout: Duration,
}

impl HealthProbe {
    /// 新しいヘルスプローブを作成
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// チェック対象URL
    ///
    /// Sakaiはポータルのログインページ、それ以外はルートを確認する。
    pub fn target_url(instance: &Instance) -> String {
        format!(
            "http://{}:{}/{}",
            instance.host,
            instance.http_port,
            instance.app_profile().login_path()
        )
    }

    /// 到達性チェック
    ///
    /// 2xxで成功。ペイロードはレイテンシ（マイクロ秒）、通信失敗時は診断メッセージ。
    pub async fn check(&self, instance: &Instance) -> CheckResult {
        let url = Self::target_url(instance);
        let start = Instant::now();
        let result = self.client.get(&url).timeout(self.timeout).send().await;
        let latency_us = latency_micros(start.elapsed());

        match result {
            Ok(response) => {
                let status = response.status();
                debug!(
                    server_id = %instance.server_id,
                    url = %url,
                    latency_us = latency_us,
                    status = status.as_u16(),
                    "Health probe completed"
                );
                CheckResult::new(
                    &instance.server_id,
                    CheckKind::Reachability,
                    status.is_success(),
                    CheckPayload::LatencyMicros(latency_us),
                )
            }
            Err(e) => {
                let error = classify_error(&e, self.timeout);
                warn!(
                    server_id = %instance.server_id,
                    url = %url,
                    error = %error,
                    "Health probe failed"
                );
                CheckResult::failure(&instance.server_id, CheckKind::Reachability, error.to_string())
            }
        }
    }
}

/// 経過時間をマイクロ秒に変換（上限で飽和）
fn latency_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
