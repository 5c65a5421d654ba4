//! Single-node status probing.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::error::DeviceError;
use crate::protocol::{StatusReport, STATUS_PATH};
use crate::types::Identity;

/// Source of node status documents.
///
/// Discovery talks to the network only through this trait.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetch and parse the status document of `address`.
    async fn fetch_status(&self, address: &str, timeout: Duration)
        -> Result<StatusReport, DeviceError>;

    /// Liveness only: does `address` answer its status path with a success
    /// code within `timeout`. The body is not inspected.
    async fn check_alive(&self, address: &str, timeout: Duration) -> bool;
}

/// [`StatusFetcher`] over plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpStatusFetcher {
    client: reqwest::Client,
}

impl HttpStatusFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn status_url(address: &str) -> String {
        format!("http://{}{}", address, STATUS_PATH)
    }
}

fn unreachable(address: &str, e: impl std::fmt::Display) -> DeviceError {
    DeviceError::Unreachable {
        ip: address.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl StatusFetcher for HttpStatusFetcher {
    async fn fetch_status(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<StatusReport, DeviceError> {
        let response = self
            .client
            .get(Self::status_url(address))
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unreachable(address, e))?;

        let body = response.bytes().await.map_err(|e| unreachable(address, e))?;

        StatusReport::parse(&body, address)
    }

    async fn check_alive(&self, address: &str, timeout: Duration) -> bool {
        match self
            .client
            .get(Self::status_url(address))
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                trace!(address, error = %e, "Liveness probe failed");
                false
            }
        }
    }
}

/// Probe `address` for its self-reported identity.
pub async fn probe<F: StatusFetcher + ?Sized>(
    fetcher: &F,
    address: &str,
    timeout: Duration,
) -> Result<Identity, DeviceError> {
    let report = fetcher.fetch_status(address, timeout).await?;
    Ok(report.identity(address))
}

/// Name for a candidate that could not be probed: the advertised
/// `hint_name` when there is one, its address otherwise.
pub fn fallback_name<'a>(address: &'a str, hint_name: &'a str) -> &'a str {
    if hint_name.is_empty() {
        address
    } else {
        hint_name
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// In-memory network: address -> status document.
    #[derive(Default)]
    pub(crate) struct FakeNetwork {
        nodes: HashMap<String, Value>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl FakeNetwork {
        pub(crate) fn with_node(mut self, address: &str, status: Value) -> Self {
            self.nodes.insert(address.to_string(), status);
            self
        }

        pub(crate) fn request_count(&self, address: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.as_str() == address)
                .count()
        }
    }

    #[async_trait]
    impl StatusFetcher for FakeNetwork {
        async fn fetch_status(
            &self,
            address: &str,
            _timeout: Duration,
        ) -> Result<StatusReport, DeviceError> {
            self.requests.lock().unwrap().push(address.to_string());
            match self.nodes.get(address) {
                Some(status) => StatusReport::from_value(status, address),
                None => Err(unreachable(address, "no route to host")),
            }
        }

        async fn check_alive(&self, address: &str, _timeout: Duration) -> bool {
            self.nodes.contains_key(address)
        }
    }

    /// Serve `status_line` and `body` to every connection on a loopback port.
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut request = Vec::new();
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status_line,
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        addr.to_string()
    }

    async fn closed_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_http_fetch_status() {
        let address = serve(
            "200 OK",
            r#"{"hostname":"eye-1","clusterName":"roof","peers":[{"ip":"10.0.0.9","hostname":"sensor9"}]}"#,
        )
        .await;
        let fetcher = HttpStatusFetcher::new();

        let identity = probe(&fetcher, &address, TIMEOUT).await.unwrap();
        assert_eq!(identity.display_name, "eye-1");
        assert_eq!(identity.description, "roof");
        assert_eq!(
            identity.peers,
            vec![("10.0.0.9".to_string(), "sensor9".to_string())]
        );
        assert!(fetcher.check_alive(&address, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_http_error_status_is_unreachable() {
        let address = serve("500 Internal Server Error", "{}").await;
        let fetcher = HttpStatusFetcher::new();

        let err = fetcher.fetch_status(&address, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, DeviceError::Unreachable { .. }));
        assert!(!fetcher.check_alive(&address, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_http_non_json_body_is_invalid() {
        let address = serve("200 OK", "<html>hello</html>").await;
        let fetcher = HttpStatusFetcher::new();

        let err = fetcher.fetch_status(&address, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, DeviceError::InvalidResponse { .. }));
        // liveness does not look at the body
        assert!(fetcher.check_alive(&address, TIMEOUT).await);
    }

    #[tokio::test]
    async fn test_http_refused_connection() {
        let address = closed_port().await;
        let fetcher = HttpStatusFetcher::new();

        assert!(fetcher.fetch_status(&address, TIMEOUT).await.is_err());
        assert!(!fetcher.check_alive(&address, TIMEOUT).await);
    }

    #[test]
    fn test_fallback_name_prefers_hint() {
        assert_eq!(fallback_name("10.0.0.9", "sensor9"), "sensor9");
        assert_eq!(fallback_name("10.0.0.10", ""), "10.0.0.10");
    }
}
