//! Integration Test: full sweep against mocked portal, instances and Jolokia
//!
//! ディレクトリ取得 → 並列チェック → レポート送信 の一連の流れを検証する

use jmx_sweep::common::config::SweepConfig;
use jmx_sweep::common::error::SweepError;
use jmx_sweep::common::types::{AggregateReport, CheckKind, CheckPayload};
use jmx_sweep::sweep::run_sweep;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JMX_PORT_A: u16 = 51001;
const JMX_PORT_B: u16 = 51002;

struct Portal {
    directory: MockServer,
    sink: MockServer,
    jolokia: MockServer,
}

impl Portal {
    async fn start() -> Self {
        Self {
            directory: MockServer::start().await,
            sink: MockServer::start().await,
            jolokia: MockServer::start().await,
        }
    }

    fn config(&self) -> SweepConfig {
        SweepConfig {
            directory_url: format!("{}/longsight/json/jmx-instances", self.directory.uri()),
            report_url: format!("{}/longsight/healthinfo", self.sink.uri()),
            metrics_proxy_url: format!("{}/jolokia", self.jolokia.uri()),
            token: "secret-token".to_string(),
            health_timeout_secs: 2,
            metrics_timeout_secs: 1,
            sweep_deadline_secs: 10,
            ..SweepConfig::default()
        }
    }

    async fn directory_returns(&self, body: Value) {
        Mock::given(method("GET"))
            .and(path("/longsight/json/jmx-instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.directory)
            .await;
    }

    async fn sink_accepts(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/longsight/healthinfo"))
            .respond_with(ResponseTemplate::new(200))
            .expect(expected_calls)
            .mount(&self.sink)
            .await;
    }

    async fn delivered_report(&self) -> AggregateReport {
        let requests = self.sink.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        serde_json::from_slice(&requests[0].body).unwrap()
    }
}

fn instance_record(server_id: &str, app: &MockServer, jmx_port: u16, project: &str) -> Value {
    let address = app.address();
    json!({
        "ServerID": server_id,
        "JvmRoute": format!("{}-route", server_id),
        "ServerIP": address.ip().to_string(),
        "HTTPPort": address.port().to_string(),
        "JmxPort": jmx_port.to_string(),
        "ProjectID": "1",
        "ProjectName": project
    })
}

fn jolokia_entries(context: &str, include_sessions: bool) -> Value {
    let mut entries = vec![
        json!({"status": 200, "timestamp": 1, "request": {"mbean": "java.lang:type=Memory"}, "value": 268435456}),
        json!({"status": 200, "timestamp": 1, "request": {"mbean": "java.lang:type=Threading"}, "value": 120}),
        json!({"status": 200, "timestamp": 1, "request": {"mbean": "java.lang:type=OperatingSystem"}, "value": 5000000000u64}),
    ];
    if include_sessions {
        entries.push(json!({
            "status": 200,
            "timestamp": 1,
            "request": {"mbean": format!("Catalina:type=Manager,host=localhost,context={}", context)},
            "value": 42
        }));
    }
    Value::Array(entries)
}

async fn app_server(health_path: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(health_path))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_sweep_reports_every_check_when_metrics_time_out() {
    let portal = Portal::start().await;
    let app_a = app_server("/portal/").await;
    let app_b = app_server("/").await;

    portal
        .directory_returns(json!([
            instance_record("A", &app_a, JMX_PORT_A, "sakai-prod"),
            instance_record("B", &app_b, JMX_PORT_B, "intranet"),
        ]))
        .await;

    Mock::given(method("POST"))
        .and(path("/jolokia"))
        .and(body_string_contains(format!(":{}/jmxrmi", JMX_PORT_A)))
        .respond_with(ResponseTemplate::new(200).set_body_json(jolokia_entries("/portal", true)))
        .mount(&portal.jolokia)
        .await;
    Mock::given(method("POST"))
        .and(path("/jolokia"))
        .and(body_string_contains(format!(":{}/jmxrmi", JMX_PORT_B)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(jolokia_entries("/", true))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&portal.jolokia)
        .await;

    portal.sink_accepts(1).await;

    let summary = run_sweep(&portal.config()).await.unwrap();

    assert_eq!(summary.instances, 2);
    assert_eq!(summary.checks, 10);
    assert_eq!(summary.failures, 4);
    assert!(summary.delivered);

    let report = portal.delivered_report().await;
    assert_eq!(report.len(), 10);

    assert_eq!(report.for_server("A").count(), 5);
    assert!(report.for_server("A").all(|r| r.success));

    let b: Vec<_> = report.for_server("B").collect();
    assert_eq!(b.len(), 5);
    for result in b {
        if result.kind == CheckKind::Reachability {
            assert!(result.success);
        } else {
            assert!(!result.success);
            assert!(matches!(&result.payload, CheckPayload::Error(m) if m.starts_with("Timeout")));
        }
    }
}

#[tokio::test]
async fn test_short_metrics_batch_yields_one_explicit_failure() {
    let portal = Portal::start().await;
    let app = app_server("/").await;

    portal
        .directory_returns(json!([instance_record("A", &app, JMX_PORT_A, "intranet")]))
        .await;
    Mock::given(method("POST"))
        .and(path("/jolokia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jolokia_entries("/", false)))
        .mount(&portal.jolokia)
        .await;
    portal.sink_accepts(1).await;

    let summary = run_sweep(&portal.config()).await.unwrap();
    assert_eq!(summary.checks, 5);
    assert_eq!(summary.failures, 1);

    let report = portal.delivered_report().await;
    let failed: Vec<_> = report.results().iter().filter(|r| !r.success).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].kind, CheckKind::ActiveSessions);
}

#[tokio::test]
async fn test_empty_directory_completes_without_report() {
    let portal = Portal::start().await;
    portal.directory_returns(json!([])).await;
    portal.sink_accepts(0).await;

    let summary = run_sweep(&portal.config()).await.unwrap();

    assert_eq!(summary.instances, 0);
    assert_eq!(summary.checks, 0);
    assert!(!summary.delivered);
}

#[tokio::test]
async fn test_directory_failure_aborts_before_probing() {
    let portal = Portal::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&portal.directory)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&portal.jolokia)
        .await;
    portal.sink_accepts(0).await;

    let result = run_sweep(&portal.config()).await;

    assert!(matches!(result, Err(SweepError::DirectoryUnavailable(_))));
}

#[tokio::test]
async fn test_report_delivery_failure_is_fatal() {
    let portal = Portal::start().await;
    let app = app_server("/").await;
    portal
        .directory_returns(json!([instance_record("A", &app, JMX_PORT_A, "intranet")]))
        .await;
    Mock::given(method("POST"))
        .and(path("/jolokia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jolokia_entries("/", true)))
        .mount(&portal.jolokia)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&portal.sink)
        .await;

    let result = run_sweep(&portal.config()).await;

    assert!(matches!(result, Err(SweepError::ReportDelivery(_))));
}

#[tokio::test]
async fn test_missing_token_fails_before_any_request() {
    let portal = Portal::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&portal.directory)
        .await;

    let config = SweepConfig {
        token: String::new(),
        ..portal.config()
    };
    let result = run_sweep(&config).await;

    assert!(matches!(result, Err(SweepError::Config(_))));
}

#[tokio::test]
async fn test_dry_run_skips_delivery() {
    let portal = Portal::start().await;
    let app = app_server("/").await;
    portal
        .directory_returns(json!([instance_record("A", &app, JMX_PORT_A, "intranet")]))
        .await;
    Mock::given(method("POST"))
        .and(path("/jolokia"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jolokia_entries("/", true)))
        .mount(&portal.jolokia)
        .await;
    portal.sink_accepts(0).await;

    let config = SweepConfig {
        dry_run: true,
        ..portal.config()
    };
    let summary = run_sweep(&config).await.unwrap();

    assert_eq!(summary.checks, 5);
    assert_eq!(summary.failures, 0);
    assert!(!summary.delivered);
}
