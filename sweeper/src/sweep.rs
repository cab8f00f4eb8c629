//! スイープ実行
//!
//! ディレクトリ取得 → 全チェック → レポート送信 の1パス

use crate::client::build_http_client;
use crate::common::config::SweepConfig;
use crate::common::error::SweepResult;
use crate::directory::DirectoryClient;
use crate::orchestrator::Orchestrator;
use crate::probe::HttpProbe;
use crate::report::ReportClient;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// スイープ結果の要約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSummary {
    /// スイープID
    pub sweep_id: Uuid,
    /// チェックしたインスタンス数
    pub instances: usize,
    /// チェック結果数
    pub checks: usize,
    /// 失敗したチェック数
    pub failures: usize,
    /// レポートを送信したか
    pub delivered: bool,
}

/// スイープを1回実行
///
/// 致命的エラーはディレクトリ取得失敗とレポート送信失敗のみ。
/// 個々のチェックの失敗はレポート内にのみ現れる。
pub async fn run_sweep(config: &SweepConfig) -> SweepResult<SweepSummary> {
    config.validate()?;

    let sweep_id = Uuid::new_v4();
    let span = info_span!("sweep", sweep_id = %sweep_id);
    sweep_once(config, sweep_id).instrument(span).await
}

async fn sweep_once(config: &SweepConfig, sweep_id: Uuid) -> SweepResult<SweepSummary> {
    let swept_at = Utc::now();
    let client = build_http_client()?;

    let instances = DirectoryClient::new(client.clone(), config)
        .fetch_instances()
        .await?;

    let probe = Arc::new(HttpProbe::new(client.clone(), config));
    let report = Orchestrator::new(probe, config.sweep_deadline())
        .run(&instances)
        .await;

    let mut summary = SweepSummary {
        sweep_id,
        instances: instances.len(),
        checks: report.len(),
        failures: report.failures(),
        delivered: false,
    };

    if report.is_empty() {
        info!("No instances registered, report omitted");
        return Ok(summary);
    }

    if config.dry_run {
        println!("{}", serde_json::to_string_pretty(&report)?);
        info!(checks = report.len(), "Dry run, report not sent");
        return Ok(summary);
    }

    ReportClient::new(client, config)
        .deliver(&report, swept_at)
        .await?;
    summary.delivered = true;
    Ok(summary)
}
