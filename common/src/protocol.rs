//! 通信プロトコル定義
//!
//! メトリクスプロキシ（Jolokia）へのバッチ読み取りリクエスト/レスポンス

use serde::{Deserialize, Serialize};

/// 読み取りリクエストの種別マーカー
pub const READ_REQUEST_TYPE: &str = "read";

/// 読み取り対象のJMXエンドポイント
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricTarget {
    /// JMXサービスURL
    pub url: String,
}

/// 1属性の読み取りリクエスト
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricRequest {
    /// リクエスト種別（常に "read"）
    #[serde(rename = "type")]
    pub request_type: String,
    /// MBean名
    pub mbean: String,
    /// 属性名
    pub attribute: String,
    /// 複合値の内部パス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// 読み取り先
    pub target: MetricTarget,
}

impl MetricRequest {
    /// 読み取りリクエストを作成
    pub fn read(
        mbean: impl Into<String>,
        attribute: impl Into<String>,
        path: Option<&str>,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            request_type: READ_REQUEST_TYPE.to_string(),
            mbean: mbean.into(),
            attribute: attribute.into(),
            path: path.map(str::to_string),
            target: MetricTarget {
                url: target_url.into(),
            },
        }
    }
}

/// レスポンスに含まれる元リクエストのエコー
///
/// エラー時は一部のフィールドが欠落するため全て任意。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EchoedRequest {
    /// MBean名
    #[serde(default)]
    pub mbean: Option<String>,
    /// 属性名（単一または配列）
    #[serde(default)]
    pub attribute: Option<serde_json::Value>,
    /// 内部パス
    #[serde(default)]
    pub path: Option<String>,
}

/// バッチレスポンスの1エントリ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricResponseEntry {
    /// プロキシ側タイムスタンプ（Unix秒）
    #[serde(default)]
    pub timestamp: u64,
    /// ステータスコード（200で成功）
    pub status: u16,
    /// 元リクエスト
    #[serde(default)]
    pub request: EchoedRequest,
    /// 読み取った値
    #[serde(default)]
    pub value: serde_json::Value,
    /// エラーメッセージ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// エラー種別（Javaの例外クラス名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl MetricResponseEntry {
    /// リモートでエラーが発生していないか
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// 応答しているMBean名
    pub fn mbean(&self) -> Option<&str> {
        self.request.mbean.as_deref()
    }

    /// 値を数値として取得
    ///
    /// 複合値（CompositeData）が返された場合は `path` のキーで解決する。
    pub fn numeric_value(&self, path: Option<&str>) -> Option<f64> {
        match (&self.value, path) {
            (serde_json::Value::Number(n), _) => n.as_f64(),
            (serde_json::Value::Object(map), Some(key)) => map.get(key).and_then(|v| v.as_f64()),
            _ => None,
        }
    }

    /// エラー内容の説明
    pub fn error_message(&self) -> String {
        match (&self.error, &self.error_type) {
            (Some(error), _) => error.clone(),
            (None, Some(error_type)) => error_type.clone(),
            (None, None) => format!("status {}", self.status),
        }
    }
}
