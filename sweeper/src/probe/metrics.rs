//! メトリクスプローブ
//!
//! メトリクスプロキシ（Jolokia）経由でJMX属性をバッチ読み取りし、
//! レスポンスの各エントリを元のチェック種別に照合する。
//!
//! レスポンスのエントリ数はリクエスト数と一致するとは限らない。
//! 照合できなかった種別は必ず明示的な失敗結果として返す。

use super::catalog::{build_batch, canonical_mbean, PlannedRead};
use crate::client::classify_error;
use crate::common::error::ProbeError;
use crate::common::protocol::{MetricRequest, MetricResponseEntry};
use crate::common::types::{CheckPayload, CheckResult, Instance};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// JMXメトリクスプローブ
#[derive(Clone)]
pub struct MetricsProbe {
    client: Client,
    proxy_url: String,
    timeout: Duration,
}

impl MetricsProbe {
    /// 新しいメトリクスプローブを作成
    pub fn new(client: Client, proxy_url: String, timeout: Duration) -> Self {
        Self {
            client,
            proxy_url,
            timeout,
        }
    }

    /// バッチ読み取りを実行
    ///
    /// 通信失敗・非2xx・デコード不能の場合は `Err`。
    /// 成功時はカタログの各種別について必ず1件ずつ結果を返す。
    pub async fn check(&self, instance: &Instance) -> Result<Vec<CheckResult>, ProbeError> {
        let plan = build_batch(instance);
        let batch: Vec<&MetricRequest> = plan.iter().map(|read| &read.request).collect();

        let response = self
            .client
            .post(&self.proxy_url)
            .timeout(self.timeout)
            .json(&batch)
            .send()
            .await
            .map_err(|e| classify_error(&e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                server_id = %instance.server_id,
                status = status.as_u16(),
                "Metrics proxy returned non-success status"
            );
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(&e, self.timeout))?;
        let entries = decode_entries(&body)?;

        debug!(
            server_id = %instance.server_id,
            requested = plan.len(),
            received = entries.len(),
            "Metrics batch decoded"
        );

        Ok(match_entries(&instance.server_id, &plan, entries))
    }
}

/// バッチレスポンスをデコード
pub fn decode_entries(body: &[u8]) -> Result<Vec<MetricResponseEntry>, ProbeError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ProbeError::Decode(e.to_string()))?;

    match value {
        // 壊れたエントリは捨てる。対応する種別は照合時に失敗結果になる
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(position, item)| {
                serde_json::from_value::<MetricResponseEntry>(item)
                    .map_err(|e| {
                        warn!(position, error = %e, "Skipping malformed metrics entry");
                    })
                    .ok()
            })
            .collect()),
        // バッチ全体がプロキシに拒否された場合は単一のエラーオブジェクトが返る
        serde_json::Value::Object(map) => {
            let reason = map
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unexpected object");
            Err(ProbeError::Decode(format!(
                "expected a batch response array: {}",
                reason
            )))
        }
        other => Err(ProbeError::Decode(format!(
            "expected a batch response array, got {}",
            other
        ))),
    }
}

/// レスポンスエントリをリクエストに照合
///
/// 未知のMBeanのエントリと、照合済み種別への重複エントリは無視する。
/// 戻り値は `plan` と同じ順序・同じ件数。
pub fn match_entries(
    server_id: &str,
    plan: &[PlannedRead],
    entries: Vec<MetricResponseEntry>,
) -> Vec<CheckResult> {
    let mut matched: Vec<Option<CheckResult>> = vec![None; plan.len()];

    for entry in entries {
        let Some(mbean) = entry.mbean() else {
            debug!(server_id = %server_id, status = entry.status, "Ignoring entry without mbean");
            continue;
        };
        let key = canonical_mbean(mbean);
        let Some(index) = plan.iter().position(|read| read.mbean_key == key) else {
            debug!(server_id = %server_id, mbean = %mbean, "Ignoring entry for unrequested mbean");
            continue;
        };
        if matched[index].is_some() {
            debug!(server_id = %server_id, mbean = %mbean, "Ignoring duplicate entry");
            continue;
        }
        matched[index] = Some(entry_result(server_id, &plan[index], &entry));
    }

    plan.iter()
        .zip(matched)
        .map(|(read, result)| {
            result.unwrap_or_else(|| {
                warn!(
                    server_id = %server_id,
                    kind = %read.kind,
                    mbean = %read.request.mbean,
                    "No response entry for requested metric"
                );
                CheckResult::failure(
                    server_id,
                    read.kind,
                    format!("no response entry for {}", read.request.mbean),
                )
            })
        })
        .collect()
}

fn entry_result(server_id: &str, read: &PlannedRead, entry: &MetricResponseEntry) -> CheckResult {
    if !entry.is_ok() {
        return CheckResult::failure(server_id, read.kind, entry.error_message());
    }

    match entry.numeric_value(read.request.path.as_deref()) {
        Some(value) => CheckResult::success(server_id, read.kind, CheckPayload::Value(value)),
        None => CheckResult::failure(
            server_id,
            read.kind,
            format!(
                "non-numeric value for {}: {}",
                read.request.attribute, entry.value
            ),
        ),
    }
}
