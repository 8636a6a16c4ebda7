//! Metadata sources: where each cycle's render context comes from.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::config::MetadataConfig;
use crate::error::{io_err, DaemonError};

/// Per-request timeout for the HTTP metadata client.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A provider of metadata snapshots. Called once per cycle from the blocking pool.
pub trait MetadataSource: Send + Sync {
    fn fetch(&self) -> Result<Value, DaemonError>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Blocking JSON client for the orchestration metadata service.
pub struct HttpMetadataSource {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpMetadataSource {
    pub fn new(config: &MetadataConfig) -> Self {
        Self::with_endpoint(config.endpoint())
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn metadata_err(&self, message: impl ToString) -> DaemonError {
        DaemonError::Metadata {
            endpoint: self.endpoint.clone(),
            message: message.to_string(),
        }
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch(&self) -> Result<Value, DaemonError> {
        let response = self
            .agent
            .get(&self.endpoint)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| self.metadata_err(e))?;
        response
            .into_json::<Value>()
            .map_err(|e| self.metadata_err(e))
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Snapshot read from a JSON or YAML document (`.yml`/`.yaml` → YAML).
pub struct FileMetadataSource {
    path: PathBuf,
}

impl FileMetadataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for FileMetadataSource {
    fn fetch(&self) -> Result<Value, DaemonError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| io_err(&self.path, e))?;
        if is_yaml(&self.path) {
            Ok(serde_yaml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use tempfile::TempDir;

    /// Serve one HTTP response and report the request line back.
    fn serve_once(status: &str, body: &str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut accept = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).expect("header") == 0 || line == "\r\n" {
                    break;
                }
                if line.to_ascii_lowercase().starts_with("accept:") {
                    accept = line.trim().to_string();
                }
            }
            stream.write_all(response.as_bytes()).expect("respond");
            let _ = tx.send(format!("{} | {}", request_line.trim(), accept));
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest);
        });
        (format!("http://{addr}"), rx)
    }

    #[test]
    fn http_source_fetches_json_from_prefixed_endpoint() {
        let (base, rx) = serve_once("200 OK", r#"{"stacks":[{"name":"web"}]}"#);
        let source = HttpMetadataSource::new(&MetadataConfig {
            url: base,
            prefix: "2016-07-29".to_string(),
            self_only: true,
        });

        let data = source.fetch().expect("fetch");
        assert_eq!(data, json!({"stacks": [{"name": "web"}]}));
        let seen = rx.recv().expect("request");
        assert!(seen.starts_with("GET /2016-07-29/self/stack HTTP/1.1"), "got: {seen}");
        assert!(seen.to_ascii_lowercase().contains("accept: application/json"), "got: {seen}");
    }

    #[test]
    fn http_error_status_is_metadata_error() {
        let (base, _rx) = serve_once("503 Service Unavailable", "{}");
        let source = HttpMetadataSource::with_endpoint(base);
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, DaemonError::Metadata { .. }), "got: {err}");
    }

    #[test]
    fn unreachable_service_is_metadata_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let err = HttpMetadataSource::with_endpoint(format!("http://{addr}"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, DaemonError::Metadata { .. }), "got: {err}");
    }

    #[test]
    fn file_source_reads_json_and_yaml() {
        let tmp = TempDir::new().unwrap();
        let json_path = tmp.path().join("data.json");
        std::fs::write(&json_path, r#"{"a": 1}"#).unwrap();
        let yaml_path = tmp.path().join("data.yml");
        std::fs::write(&yaml_path, "a: 1\nlabels:\n  x: y\n").unwrap();

        assert_eq!(FileMetadataSource::new(&json_path).fetch().unwrap(), json!({"a": 1}));
        assert_eq!(
            FileMetadataSource::new(&yaml_path).fetch().unwrap(),
            json!({"a": 1, "labels": {"x": "y"}})
        );
    }

    #[test]
    fn file_source_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = FileMetadataSource::new(tmp.path().join("none.json"))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, DaemonError::Io { .. }), "got: {err}");
    }
}
