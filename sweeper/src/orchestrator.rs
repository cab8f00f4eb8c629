//! チェックオーケストレーター
//!
//! インスタンスごとにヘルスチェックタスクとメトリクスタスクを起動し、
//! 1本のmpscチャネルで結果を回収する。
//!
//! ディスパッチした (インスタンス, 種別) の組は必ず1件の結果になる。
//! スイープ期限の超過やタスクの異常終了で届かなかった組は失敗結果で埋める。

use crate::common::types::{AggregateReport, CheckKind, CheckResult, Instance};
use crate::probe::Probe;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// 期限超過で埋めた結果のメッセージ
pub const DEADLINE_EXCEEDED_MESSAGE: &str = "sweep deadline exceeded";

/// タスクが結果を返さずに終了した場合のメッセージ
pub const NO_RESULT_MESSAGE: &str = "probe task ended without a result";

/// ディスパッチ単位のキー（インスタンス番号, チェック種別）
type DispatchKey = (usize, CheckKind);

/// タスクからの結果通知
struct Arrival {
    index: usize,
    dispatched: &'static [CheckKind],
    results: Vec<CheckResult>,
}

/// チェックオーケストレーター
#[derive(Clone)]
pub struct Orchestrator {
    probe: Arc<dyn Probe>,
    deadline: Duration,
}

impl Orchestrator {
    /// 新しいオーケストレーターを作成
    ///
    /// `deadline` はスイープ全体の期限。各プローブ自身のタイムアウトとは別に適用される。
    pub fn new(probe: Arc<dyn Probe>, deadline: Duration) -> Self {
        Self { probe, deadline }
    }

    /// 全インスタンスをチェックして集計レポートを作成
    pub async fn run(&self, instances: &[Instance]) -> AggregateReport {
        if instances.is_empty() {
            info!("No instances to check");
            return AggregateReport::default();
        }

        let deadline = Instant::now() + self.deadline;
        let mut pending: BTreeSet<DispatchKey> = (0..instances.len())
            .flat_map(|index| CheckKind::ALL.iter().map(move |kind| (index, *kind)))
            .collect();

        info!(
            instances = instances.len(),
            checks = pending.len(),
            "Dispatching checks"
        );

        // 容量はタスク数と同じなので送信がブロックすることはない
        let (tx, mut rx) = mpsc::channel::<Arrival>(instances.len() * 2);
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(instances.len() * 2);

        for (index, instance) in instances.iter().enumerate() {
            handles.push(self.spawn_health(index, instance.clone(), tx.clone()));
            handles.push(self.spawn_metrics(index, instance.clone(), tx.clone()));
        }
        drop(tx);

        let mut collected: BTreeMap<DispatchKey, CheckResult> = BTreeMap::new();

        while !pending.is_empty() {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(arrival)) => accept(arrival, &mut pending, &mut collected),
                Ok(None) => {
                    warn!(
                        missing = pending.len(),
                        "Probe tasks ended without reporting every result"
                    );
                    fill_missing(instances, &pending, &mut collected, NO_RESULT_MESSAGE);
                    break;
                }
                Err(_) => {
                    warn!(
                        missing = pending.len(),
                        deadline_secs = self.deadline.as_secs_f64(),
                        "Sweep deadline exceeded"
                    );
                    fill_missing(instances, &pending, &mut collected, DEADLINE_EXCEEDED_MESSAGE);
                    break;
                }
            }
        }

        for handle in &handles {
            handle.abort();
        }

        let report = AggregateReport::new(collected.into_values().collect());
        info!(
            checks = report.len(),
            succeeded = report.successes(),
            failed = report.failures(),
            "All checks collected"
        );
        report
    }

    fn spawn_health(
        &self,
        index: usize,
        instance: Instance,
        tx: mpsc::Sender<Arrival>,
    ) -> JoinHandle<()> {
        let probe = Arc::clone(&self.probe);
        tokio::spawn(async move {
            let result = probe.check_health(&instance).await;
            let _ = tx
                .send(Arrival {
                    index,
                    dispatched: &[CheckKind::Reachability],
                    results: vec![result],
                })
                .await;
        })
    }

    fn spawn_metrics(
        &self,
        index: usize,
        instance: Instance,
        tx: mpsc::Sender<Arrival>,
    ) -> JoinHandle<()> {
        let probe = Arc::clone(&self.probe);
        tokio::spawn(async move {
            let results = match probe.check_metrics(&instance).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(
                        server_id = %instance.server_id,
                        error = %e,
                        "Metrics probe failed"
                    );
                    CheckKind::METRICS
                        .iter()
                        .map(|kind| CheckResult::failure(&instance.server_id, *kind, e.to_string()))
                        .collect()
                }
            };
            let _ = tx
                .send(Arrival {
                    index,
                    dispatched: &CheckKind::METRICS,
                    results,
                })
                .await;
        })
    }
}

fn accept(
    arrival: Arrival,
    pending: &mut BTreeSet<DispatchKey>,
    collected: &mut BTreeMap<DispatchKey, CheckResult>,
) {
    for result in arrival.results {
        let key = (arrival.index, result.kind);
        // タスクが担当していない種別の結果は受け付けない
        if arrival.dispatched.contains(&result.kind) && pending.remove(&key) {
            collected.insert(key, result);
        } else {
            debug!(
                server_id = %result.server_id,
                kind = %result.kind,
                "Ignoring duplicate or unexpected result"
            );
        }
    }
}

fn fill_missing(
    instances: &[Instance],
    pending: &BTreeSet<DispatchKey>,
    collected: &mut BTreeMap<DispatchKey, CheckResult>,
    message: &str,
) {
    for &(index, kind) in pending {
        let server_id = &instances[index].server_id;
        collected.insert(
            (index, kind),
            CheckResult::failure(server_id.as_str(), kind, message),
        );
    }
}
