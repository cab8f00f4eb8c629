//! インスタンスディレクトリクライアント
//!
//! 管理ポータルから監視対象インスタンス一覧を取得する

use crate::common::config::SweepConfig;
use crate::common::error::{SweepError, SweepResult};
use crate::common::types::Instance;
use crate::client::describe;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

/// ポータルへのリクエストのタイムアウト（秒）
const DIRECTORY_TIMEOUT_SECS: u64 = 30;

/// インスタンスディレクトリクライアント
#[derive(Clone)]
pub struct DirectoryClient {
    client: Client,
    url: String,
    token: String,
    user_agent: String,
    ip_filter: Option<String>,
    client_id: Option<String>,
}

impl DirectoryClient {
    /// 新しいディレクトリクライアントを作成
    pub fn new(client: Client, config: &SweepConfig) -> Self {
        Self {
            client,
            url: config.directory_url.clone(),
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
            ip_filter: non_empty(config.ip_filter.as_deref()),
            client_id: non_empty(config.client_id.as_deref()),
        }
    }

    /// 絞り込み用クエリパラメータ
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref ips) = self.ip_filter {
            params.push(("ips", ips.clone()));
        }
        if let Some(ref client_id) = self.client_id {
            params.push(("clientID", client_id.clone()));
        }
        params
    }

    /// インスタンス一覧を取得
    ///
    /// 2xx以外・通信失敗・不正なレスポンスは `SweepError::DirectoryUnavailable`。
    pub async fn fetch_instances(&self) -> SweepResult<Vec<Instance>> {
        let response = self
            .client
            .get(&self.url)
            .query(&self.query_params())
            .bearer_auth(&self.token)
            .header(USER_AGENT, &self.user_agent)
            .timeout(Duration::from_secs(DIRECTORY_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| SweepError::DirectoryUnavailable(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %self.url, "Bad HTTP fetch from instance directory");
            return Err(SweepError::DirectoryUnavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SweepError::DirectoryUnavailable(describe(&e)))?;
        let instances = parse_instances(&body)?;

        debug!(?instances, "Raw data from instance directory");
        info!(count = instances.len(), "Fetched instances from directory");
        Ok(instances)
    }
}

/// ディレクトリのレスポンス本文をパース
///
/// 空の本文と `null` は空の一覧として扱う。
pub fn parse_instances(body: &str) -> SweepResult<Vec<Instance>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    serde_json::from_str(trimmed)
        .map_err(|e| SweepError::DirectoryUnavailable(format!("invalid instance list: {}", e)))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
