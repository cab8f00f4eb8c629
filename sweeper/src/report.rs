//! レポート送信クライアント
//!
//! 集計レポートを管理ポータルへPOSTする。再送はしない。

use crate::client::describe;
use crate::common::config::SweepConfig;
use crate::common::error::{SweepError, SweepResult};
use crate::common::types::AggregateReport;
use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// ポータルへのリクエストのタイムアウト（秒）
const REPORT_TIMEOUT_SECS: u64 = 30;

/// レポート送信クライアント
#[derive(Clone)]
pub struct ReportClient {
    client: Client,
    url: String,
    token: String,
    user_agent: String,
}

impl ReportClient {
    /// 新しいレポート送信クライアントを作成
    pub fn new(client: Client, config: &SweepConfig) -> Self {
        Self {
            client,
            url: config.report_url.clone(),
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// レポートを送信
    ///
    /// `swept_at` はUnix秒として `time` クエリパラメータに付与する。
    pub async fn deliver(
        &self,
        report: &AggregateReport,
        swept_at: DateTime<Utc>,
    ) -> SweepResult<()> {
        debug!(checks = report.len(), url = %self.url, "Sending report");

        let response = self
            .client
            .post(&self.url)
            .query(&[("time", swept_at.timestamp().to_string())])
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
            .timeout(Duration::from_secs(REPORT_TIMEOUT_SECS))
            .json(report)
            .send()
            .await
            .map_err(|e| {
                let message = describe(&e);
                error!(error = %message, "Could not POST report");
                SweepError::ReportDelivery(message)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Report sink rejected the report");
            return Err(SweepError::ReportDelivery(format!("HTTP {}", status)));
        }

        info!(checks = report.len(), status = %status, "Report delivered");
        Ok(())
    }
}
