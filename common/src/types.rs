//! 共通型定義
//!
//! Instance, CheckResult, AggregateReport等のコアデータ型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 監視対象のアプリケーションサーバーインスタンス
///
/// 管理ポータルのディレクトリAPIが返すレコード。取得後は変更しない。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instance {
    /// サーバーID
    #[serde(rename = "ServerID")]
    pub server_id: String,
    /// JVMルート名
    #[serde(rename = "JvmRoute", default)]
    pub jvm_route: String,
    /// ホストアドレス
    #[serde(rename = "ServerIP")]
    pub host: String,
    /// HTTPポート番号
    #[serde(rename = "HTTPPort", deserialize_with = "deserialize_port")]
    pub http_port: u16,
    /// JMX（管理）ポート番号
    #[serde(rename = "JmxPort", deserialize_with = "deserialize_port")]
    pub jmx_port: u16,
    /// プロジェクトID
    #[serde(rename = "ProjectID", default)]
    pub project_id: String,
    /// プロジェクト名（アプリケーション種別の判定に使用）
    #[serde(rename = "ProjectName", default)]
    pub project_name: String,
}

impl Instance {
    /// プロジェクト名からアプリケーション種別を判定
    pub fn app_profile(&self) -> AppProfile {
        if self.project_name.to_ascii_lowercase().contains("sakai") {
            AppProfile::Sakai
        } else {
            AppProfile::Generic
        }
    }

    /// JMX RMIサービスURL
    pub fn jmx_service_url(&self) -> String {
        format!(
            "service:jmx:rmi:///jndi/rmi://{}:{}/jmxrmi",
            self.host, self.jmx_port
        )
    }
}

// ディレクトリAPIはポートを文字列で返すことがある
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match RawPort::deserialize(deserializer)? {
        RawPort::Number(port) => Ok(port),
        RawPort::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port: {:?}", text))),
    }
}

/// アプリケーション種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppProfile {
    /// Sakai（ポータル配下にログインページを持つ）
    Sakai,
    /// その他のTomcatアプリケーション
    Generic,
}

impl AppProfile {
    /// ヘルスチェックURLに付与するパス
    pub fn login_path(&self) -> &'static str {
        match self {
            AppProfile::Sakai => "portal/",
            AppProfile::Generic => "",
        }
    }

    /// セッション数を読むTomcat Managerのコンテキスト
    pub fn session_context(&self) -> &'static str {
        match self {
            AppProfile::Sakai => "/portal",
            AppProfile::Generic => "/",
        }
    }
}

/// チェック種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// HTTP到達性
    Reachability,
    /// ヒープ使用量
    HeapUsed,
    /// ライブスレッド数
    ThreadCount,
    /// プロセスCPU時間
    CpuTime,
    /// アクティブセッション数
    ActiveSessions,
}

impl CheckKind {
    /// 全チェック種別
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Reachability,
        CheckKind::HeapUsed,
        CheckKind::ThreadCount,
        CheckKind::CpuTime,
        CheckKind::ActiveSessions,
    ];

    /// メトリクスプローブが扱う種別
    pub const METRICS: [CheckKind; 4] = [
        CheckKind::HeapUsed,
        CheckKind::ThreadCount,
        CheckKind::CpuTime,
        CheckKind::ActiveSessions,
    ];

    /// 文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Reachability => "reachability",
            CheckKind::HeapUsed => "heap_used",
            CheckKind::ThreadCount => "thread_count",
            CheckKind::CpuTime => "cpu_time",
            CheckKind::ActiveSessions => "active_sessions",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// チェック結果のペイロード
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CheckPayload {
    /// リクエストのレイテンシ（マイクロ秒）
    LatencyMicros(u64),
    /// 取得した数値
    Value(f64),
    /// エラーメッセージ
    Error(String),
}

/// 1インスタンスに対する1プローブの結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    /// サーバーID
    #[serde(rename = "ServerID")]
    pub server_id: String,
    /// チェック種別
    #[serde(rename = "CheckKind")]
    pub kind: CheckKind,
    /// 成功フラグ
    #[serde(rename = "ServerStatus")]
    pub success: bool,
    /// レイテンシ、数値、またはエラーメッセージ
    #[serde(rename = "ServerResponse")]
    pub payload: CheckPayload,
    /// チェック完了時刻
    #[serde(rename = "CheckedAt")]
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// チェック結果を作成
    pub fn new(
        server_id: impl Into<String>,
        kind: CheckKind,
        success: bool,
        payload: CheckPayload,
    ) -> Self {
        Self {
            server_id: server_id.into(),
            kind,
            success,
            payload,
            checked_at: Utc::now(),
        }
    }

    /// 成功結果を作成
    pub fn success(server_id: impl Into<String>, kind: CheckKind, payload: CheckPayload) -> Self {
        Self::new(server_id, kind, true, payload)
    }

    /// 失敗結果を作成
    pub fn failure(
        server_id: impl Into<String>,
        kind: CheckKind,
        message: impl Into<String>,
    ) -> Self {
        Self::new(server_id, kind, false, CheckPayload::Error(message.into()))
    }
}

/// 1回のスイープで得られた全チェック結果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AggregateReport {
    results: Vec<CheckResult>,
}

impl AggregateReport {
    /// チェック結果から作成
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    /// チェック結果一覧
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// 結果数
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// 結果が空か
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 成功したチェック数
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// 失敗したチェック数
    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }

    /// 指定サーバーの結果
    pub fn for_server<'a>(&'a self, server_id: &'a str) -> impl Iterator<Item = &'a CheckResult> {
        self.results.iter().filter(move |r| r.server_id == server_id)
    }
}
