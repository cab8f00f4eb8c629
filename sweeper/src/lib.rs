//! JMX Sweep
//!
//! Tomcatインスタンス群のHTTP到達性とJMXメトリクスを並列に確認し、
//! 集計結果を管理ポータルへ送信する

#![warn(missing_docs)]

/// 共通型定義（jmx-sweep-commonの再エクスポート）
pub use jmx_sweep_common as common;

/// CLIインターフェース
pub mod cli;

/// 共有HTTPクライアントとエラー分類
pub mod client;

/// インスタンスディレクトリクライアント
pub mod directory;

/// ロギング初期化ユーティリティ
pub mod logging;

/// チェックオーケストレーター（ファンアウト/ファンイン）
pub mod orchestrator;

/// ヘルスプローブとメトリクスプローブ
pub mod probe;

/// レポート送信クライアント
pub mod report;

/// スイープ実行（ディレクトリ取得 → チェック → レポート送信）
pub mod sweep;
