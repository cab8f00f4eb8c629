//! CLI module for jmx-sweep
//!
//! Parses command-line flags (with environment fallbacks) into a `SweepConfig`.

use crate::common::config::{
    SweepConfig, DEFAULT_DIRECTORY_URL, DEFAULT_METRICS_PROXY_URL, DEFAULT_REPORT_URL,
    DEFAULT_USER_AGENT,
};
use clap::Parser;

/// JMX sweep - one-shot health and JMX metrics check for registered Tomcat instances
#[derive(Parser, Debug, Clone)]
#[command(name = "jmx-sweep")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    JMX_SWEEP_TOKEN         Security token for the admin portal (required)
    JMX_SWEEP_IPS           Comma separated IPs to check
    JMX_SWEEP_CLIENT_ID     Client id filter
    JMX_SWEEP_JOLOKIA_URL   Jolokia endpoint
    JMX_SWEEP_LOG_LEVEL     Log level (default: info)
    JMX_SWEEP_LOG_DIR       Also write daily log files to this directory
"#)]
pub struct Cli {
    /// Security token forwarded to the admin portal
    #[arg(long, env = "JMX_SWEEP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Comma separated IPs to check
    #[arg(long = "ips", env = "JMX_SWEEP_IPS")]
    pub ips: Option<String>,

    /// Client id filter
    #[arg(long = "client-id", env = "JMX_SWEEP_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Jolokia endpoint
    #[arg(long = "jolokia", default_value = DEFAULT_METRICS_PROXY_URL, env = "JMX_SWEEP_JOLOKIA_URL")]
    pub jolokia_url: String,

    /// Instance directory URL
    #[arg(long, default_value = DEFAULT_DIRECTORY_URL, env = "JMX_SWEEP_DIRECTORY_URL")]
    pub directory_url: String,

    /// Report sink URL
    #[arg(long, default_value = DEFAULT_REPORT_URL, env = "JMX_SWEEP_REPORT_URL")]
    pub report_url: String,

    /// User-Agent sent to the admin portal
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "JMX_SWEEP_USER_AGENT")]
    pub user_agent: String,

    /// Health probe timeout in seconds
    #[arg(long, default_value_t = 7, env = "JMX_SWEEP_HEALTH_TIMEOUT")]
    pub health_timeout: u64,

    /// Metrics probe timeout in seconds
    #[arg(long, default_value_t = 3, env = "JMX_SWEEP_METRICS_TIMEOUT")]
    pub metrics_timeout: u64,

    /// Deadline for the whole sweep in seconds
    #[arg(long, default_value_t = 30, env = "JMX_SWEEP_DEADLINE")]
    pub sweep_deadline: u64,

    /// Print the report instead of sending it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Cli {
    /// Build the immutable sweep configuration
    pub fn into_config(self) -> SweepConfig {
        SweepConfig {
            directory_url: self.directory_url,
            report_url: self.report_url,
            metrics_proxy_url: self.jolokia_url,
            token: self.token.unwrap_or_default(),
            ip_filter: self.ips,
            client_id: self.client_id,
            user_agent: self.user_agent,
            health_timeout_secs: self.health_timeout,
            metrics_timeout_secs: self.metrics_timeout,
            sweep_deadline_secs: self.sweep_deadline,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_match_sweep_config_defaults() {
        std::env::remove_var("JMX_SWEEP_TOKEN");
        let config = Cli::try_parse_from(["jmx-sweep", "--token", "abc"])
            .unwrap()
            .into_config();

        let expected = SweepConfig {
            token: "abc".to_string(),
            ..SweepConfig::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    #[serial]
    fn test_flags_override_defaults() {
        let config = Cli::try_parse_from([
            "jmx-sweep",
            "--token",
            "abc",
            "--ips",
            "10.0.0.1",
            "--client-id",
            "9",
            "--jolokia",
            "http://proxy:8778/jolokia",
            "--metrics-timeout",
            "2",
            "--dry-run",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.ip_filter.as_deref(), Some("10.0.0.1"));
        assert_eq!(config.client_id.as_deref(), Some("9"));
        assert_eq!(config.metrics_proxy_url, "http://proxy:8778/jolokia");
        assert_eq!(config.metrics_timeout_secs, 2);
        assert!(config.dry_run);
    }

    #[test]
    #[serial]
    fn test_missing_token_fails_validation() {
        std::env::remove_var("JMX_SWEEP_TOKEN");
        let config = Cli::try_parse_from(["jmx-sweep"]).unwrap().into_config();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_token_from_environment() {
        std::env::set_var("JMX_SWEEP_TOKEN", "from-env");
        let config = Cli::try_parse_from(["jmx-sweep"]).unwrap().into_config();
        std::env::remove_var("JMX_SWEEP_TOKEN");

        assert_eq!(config.token, "from-env");
    }

    #[test]
    fn test_rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["jmx-sweep", "--health-timeout", "soon"]).is_err());
    }
}
