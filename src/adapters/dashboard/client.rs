//! HTTP transport to the QuickScan dashboard
//!
//! One call to [`Transport::send`] issues exactly one request. Retrying is
//! the offline queue's job, so nothing here loops.

use super::models::{TransmissionAck, TransmissionMetadata, TransmitRequest};
use crate::config::DashboardConfig;
use crate::domain::{EncryptedPayload, QuickScanError, Result, TransportError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Header carrying the wire protocol version
pub const VERSION_HEADER: &str = "X-QuickScan-Version";

/// Header identifying the kind of client sending the record
pub const DEVICE_TYPE_HEADER: &str = "X-Device-Type";

const MAX_ERROR_BODY: usize = 512;

/// Delivery of encoded session records to the dashboard
///
/// Implementations are stateless with respect to the records they carry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one payload
    ///
    /// # Errors
    ///
    /// - [`TransportError::RemoteRejected`] for a non-success HTTP status
    /// - [`TransportError::Timeout`] when the request timeout elapses
    /// - [`TransportError::Unreachable`] for any other network failure
    async fn send(
        &self,
        payload: &EncryptedPayload,
        metadata: &TransmissionMetadata,
    ) -> std::result::Result<TransmissionAck, TransportError>;

    /// Query the dashboard's health endpoint; never fails
    async fn check_connection(&self) -> bool;

    /// Endpoint records are delivered to, for logging
    fn endpoint(&self) -> &str;
}

/// reqwest-backed [`Transport`]
///
/// # Example
///
/// ```no_run
/// use quickscan::adapters::dashboard::{HttpTransport, Transport};
/// use quickscan::config::DashboardConfig;
///
/// # async fn example() -> quickscan::domain::Result<()> {
/// let transport = HttpTransport::new(&DashboardConfig::default())?;
/// if transport.check_connection().await {
///     println!("Dashboard reachable at {}", transport.endpoint());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    transmit_url: String,
    health_url: String,
    protocol_version: String,
    client_type: String,
    timeout: Duration,
    health_timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from the dashboard configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("quickscan/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the dashboard client");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            QuickScanError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            transmit_url: config.transmit_url(),
            health_url: config.health_url(),
            protocol_version: config.protocol_version.clone(),
            client_type: config.client_type.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            health_timeout: Duration::from_secs(config.health_timeout_seconds),
        })
    }

    fn map_request_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(format!(
                "no response from {} within {}s",
                self.transmit_url,
                self.timeout.as_secs()
            ))
        } else {
            TransportError::Unreachable(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        payload: &EncryptedPayload,
        metadata: &TransmissionMetadata,
    ) -> std::result::Result<TransmissionAck, TransportError> {
        let body = TransmitRequest {
            encrypted_data: payload,
            metadata,
        };

        tracing::debug!(
            url = %self.transmit_url,
            algorithm = %payload.algorithm,
            device_id = %metadata.device_id,
            "Sending session record to dashboard"
        );

        let response = self
            .client
            .post(&self.transmit_url)
            .timeout(self.timeout)
            .header(VERSION_HEADER, &self.protocol_version)
            .header(DEVICE_TYPE_HEADER, &self.client_type)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !status.is_success() {
            let mut message: String = text.chars().take(MAX_ERROR_BODY).collect();
            if message.is_empty() {
                message = status
                    .canonical_reason()
                    .unwrap_or("request rejected")
                    .to_string();
            }
            return Err(TransportError::RemoteRejected {
                status_code: status.as_u16(),
                message,
            });
        }

        let ack = TransmissionAck::from_body(&text);
        tracing::debug!(
            transmission_id = ack.transmission_id.as_deref().unwrap_or("-"),
            "Dashboard acknowledged transmission"
        );
        Ok(ack)
    }

    async fn check_connection(&self) -> bool {
        match self
            .client
            .get(&self.health_url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                tracing::debug!(
                    url = %self.health_url,
                    status = response.status().as_u16(),
                    healthy,
                    "Dashboard health check finished"
                );
                healthy
            }
            Err(e) => {
                tracing::debug!(url = %self.health_url, error = %e, "Dashboard health check failed");
                false
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.transmit_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceId;
    use mockito::Matcher;

    fn config_for(base_url: &str) -> DashboardConfig {
        DashboardConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 1,
            health_timeout_seconds: 1,
            ..Default::default()
        }
    }

    fn sample_request() -> (EncryptedPayload, TransmissionMetadata) {
        (
            EncryptedPayload::new("ZW5jcnlwdGVk".to_string(), "simulation-base64"),
            TransmissionMetadata::now(
                DeviceId::new("DEVICE_1700000000000_k2j9x1").unwrap(),
                "1.0.0",
            ),
        )
    }

    #[tokio::test]
    async fn test_send_success_with_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/quickscan/transmit")
            .match_header("x-quickscan-version", "1.0")
            .match_header("x-device-type", "nurse-assistant")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "encryptedData": { "encrypted": "ZW5jcnlwdGVk", "algorithm": "simulation-base64" },
                "metadata": { "deviceId": "DEVICE_1700000000000_k2j9x1", "appVersion": "1.0.0" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"transmissionId":"tx-1","timestamp":"2025-01-01T00:00:00Z"}"#)
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        let (payload, metadata) = sample_request();
        let ack = transport.send(&payload, &metadata).await.unwrap();

        assert_eq!(ack.transmission_id.as_deref(), Some("tx-1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_non_success_is_remote_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/quickscan/transmit")
            .with_status(503)
            .with_body("maintenance")
            .expect(1)
            .create_async()
            .await;

        let transport = HttpTransport::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        let (payload, metadata) = sample_request();
        let err = transport.send(&payload, &metadata).await.unwrap_err();

        assert_eq!(
            err,
            TransportError::RemoteRejected {
                status_code: 503,
                message: "maintenance".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&config_for(&format!("http://{addr}/api"))).unwrap();
        let (payload, metadata) = sample_request();
        let err = transport.send(&payload, &metadata).await.unwrap_err();

        assert!(matches!(err, TransportError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_send_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut open = Vec::new();
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    open.push(socket);
                }
            }
        });

        let transport = HttpTransport::new(&config_for(&format!("http://{addr}/api"))).unwrap();
        let (payload, metadata) = sample_request();
        let err = transport.send(&payload, &metadata).await.unwrap_err();

        assert!(matches!(err, TransportError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_check_connection() {
        let mut server = mockito::Server::new_async().await;
        let healthy = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let transport = HttpTransport::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        assert!(transport.check_connection().await);
        healthy.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_connection_swallows_failures() {
        let mut server = mockito::Server::new_async().await;
        let _unhealthy = server
            .mock("GET", "/api/health")
            .with_status(500)
            .create_async()
            .await;

        let transport = HttpTransport::new(&config_for(&format!("{}/api", server.url()))).unwrap();
        assert!(!transport.check_connection().await);

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let offline = HttpTransport::new(&config_for(&format!("http://{addr}/api"))).unwrap();
        assert!(!offline.check_connection().await);
    }
}
