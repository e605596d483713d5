//! Declarative form of an [`HttpCall`], loadable from YAML.

use crate::http_call::HttpCall;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// YAML shape of an HTTP call step.
///
/// ```yaml
/// method: GET
/// port: 15001
/// body: hello
/// request_headers:
///   x-request-id: abc
/// response_headers:
///   x-envoy-upstream-service-time: "*"
///   server: "-"
/// timeout_ms: 2000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCallConfig {
    #[serde(default = "default_method")]
    pub method: String,
    pub port: u16,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub request_headers: IndexMap<String, String>,
    #[serde(default)]
    pub response_headers: IndexMap<String, String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl HttpCallConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl From<HttpCallConfig> for HttpCall {
    fn from(config: HttpCallConfig) -> Self {
        HttpCall {
            method: config.method,
            port: config.port,
            body: config.body,
            request_headers: config.request_headers,
            response_headers: config.response_headers,
            timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Load an HTTP call step from a YAML file.
pub fn load_call<P: AsRef<Path>>(path: P) -> Result<HttpCall> {
    let path = path.as_ref();
    info!("Loading HTTP call from {}", path.display());

    let content = fs::read_to_string(path)
        .context(format!("Failed to read step file: {}", path.display()))?;
    let config = HttpCallConfig::from_yaml(&content)
        .context(format!("Failed to parse YAML from {}", path.display()))?;

    debug!(
        "Loaded {} call to port {} ({} header checks)",
        config.method,
        config.port,
        config.response_headers.len()
    );
    Ok(config.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = HttpCallConfig::from_yaml("port: 8080\n").unwrap();
        assert_eq!(config.method, "GET");
        assert_eq!(config.body, "");
        assert!(config.request_headers.is_empty());
        assert!(config.timeout_ms.is_none());

        let call: HttpCall = config.into();
        assert_eq!(call.port, 8080);
        assert!(call.timeout.is_none());
    }

    #[test]
    fn test_header_order_is_preserved() {
        let yaml = "port: 1\nresponse_headers:\n  zz: \"*\"\n  aa: \"-\"\n  mm: v\n";
        let call: HttpCall = HttpCallConfig::from_yaml(yaml).unwrap().into();
        let names: Vec<&str> =
            call.response_headers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zz", "aa", "mm"]);
        assert_eq!(call.response_headers["zz"], "*");
        assert_eq!(call.response_headers["aa"], "-");
    }

    #[test]
    fn test_timeout_ms_converts_to_duration() {
        let yaml = "method: POST\nport: 2\ntimeout_ms: 1500\n";
        let call: HttpCall = HttpCallConfig::from_yaml(yaml).unwrap().into();
        assert_eq!(call.method, "POST");
        assert_eq!(call.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_missing_port_is_rejected() {
        assert!(HttpCallConfig::from_yaml("method: GET\n").is_err());
    }

    #[test]
    fn test_load_call_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.yaml");
        std::fs::write(
            &path,
            "port: 15000\nbody: ok\nrequest_headers:\n  x-id: \"1\"\n",
        )
        .unwrap();

        let call = load_call(&path).unwrap();
        assert_eq!(call.port, 15000);
        assert_eq!(call.body, "ok");
        assert_eq!(call.request_headers["x-id"], "1");
    }

    #[test]
    fn test_load_call_names_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = load_call(&path).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"));
    }
}
