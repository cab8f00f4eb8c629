//! メトリクスカタログ
//!
//! 読み取るJMX属性の静的定義。インスタンスごとに差し込むのは
//! JMXサービスURLとアプリケーション種別のコンテキストのみ。

use crate::common::protocol::MetricRequest;
use crate::common::types::{AppProfile, CheckKind, Instance};

/// MBean名中のWebコンテキストのプレースホルダー
const CONTEXT_PLACEHOLDER: &str = "{context}";

/// 1メトリクスの定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDefinition {
    /// チェック種別
    pub kind: CheckKind,
    /// MBean名（`{context}` を含む場合がある）
    pub mbean: &'static str,
    /// 属性名
    pub attribute: &'static str,
    /// 複合値の内部パス
    pub path: Option<&'static str>,
}

impl MetricDefinition {
    /// アプリケーション種別に応じたMBean名
    pub fn mbean_for(&self, profile: AppProfile) -> String {
        self.mbean.replace(CONTEXT_PLACEHOLDER, profile.session_context())
    }
}

/// 読み取るメトリクス一覧
pub const METRIC_CATALOG: [MetricDefinition; 4] = [
    MetricDefinition {
        kind: CheckKind::HeapUsed,
        mbean: "java.lang:type=Memory",
        attribute: "HeapMemoryUsage",
        path: Some("used"),
    },
    MetricDefinition {
        kind: CheckKind::ThreadCount,
        mbean: "java.lang:type=Threading",
        attribute: "ThreadCount",
        path: None,
    },
    MetricDefinition {
        kind: CheckKind::CpuTime,
        mbean: "java.lang:type=OperatingSystem",
        attribute: "ProcessCpuTime",
        path: None,
    },
    MetricDefinition {
        kind: CheckKind::ActiveSessions,
        mbean: "Catalina:type=Manager,host=localhost,context={context}",
        attribute: "activeSessions",
        path: None,
    },
];

/// バッチ内の1読み取り
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRead {
    /// チェック種別
    pub kind: CheckKind,
    /// プロキシに送るリクエスト
    pub request: MetricRequest,
    /// 照合用に正規化したMBean名
    pub mbean_key: String,
}

/// インスタンス向けのバッチを作成
pub fn build_batch(instance: &Instance) -> Vec<PlannedRead> {
    let profile = instance.app_profile();
    let target_url = instance.jmx_service_url();

    METRIC_CATALOG
        .iter()
        .map(|definition| {
            let mbean = definition.mbean_for(profile);
            PlannedRead {
                kind: definition.kind,
                mbean_key: canonical_mbean(&mbean),
                request: MetricRequest::read(
                    mbean,
                    definition.attribute,
                    definition.path,
                    target_url.clone(),
                ),
            }
        })
        .collect()
}

/// MBean名を正規化
///
/// ObjectNameのキープロパティは順不同のため、キー順に並べ替えて比較する。
pub fn canonical_mbean(name: &str) -> String {
    let Some((domain, properties)) = name.split_once(':') else {
        return name.trim().to_string();
    };

    let mut pairs: Vec<&str> = properties
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    pairs.sort_unstable_by(|a, b| property_key(a).cmp(property_key(b)));

    format!("{}:{}", domain.trim(), pairs.join(","))
}

fn property_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}
