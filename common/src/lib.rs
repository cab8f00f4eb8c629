//! JMX Sweep 共通ライブラリ
//!
//! データモデル、メトリクスプロキシのワイヤ型、設定、エラー型

#![warn(missing_docs)]

/// 設定管理
pub mod config;

/// エラー型定義
pub mod error;

/// メトリクスプロキシ（Jolokia）通信プロトコル
pub mod protocol;

/// 共通型定義
pub mod types;
