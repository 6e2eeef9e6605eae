// src/probe/http.rs
use super::{ProbeOutcome, ProbeResult, Prober};
use crate::config::ProbeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Probes one URL with a plain `GET`.
pub struct HttpProber {
    url: Url,
    timeout: Duration,
    client: Client,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: config.url.clone(),
            timeout: config.timeout(),
            client,
        })
    }

    fn classify_error(&self, err: reqwest::Error) -> ProbeOutcome {
        if err.is_timeout() {
            ProbeOutcome::Timeout {
                after: self.timeout,
            }
        } else {
            ProbeOutcome::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> ProbeResult {
        debug!("Probing {}", self.url);

        let response = match self.client.get(self.url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return ProbeResult::new(self.classify_error(e)),
        };

        let status = response.status();
        // A body that stalls or is cut off is a transport failure, whatever the status line said.
        let body = match response.bytes().await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => return ProbeResult::new(self.classify_error(e)),
        };

        let outcome = if status == StatusCode::OK {
            ProbeOutcome::Success { body }
        } else {
            ProbeOutcome::HttpError {
                status: status.as_u16(),
                body,
            }
        };

        ProbeResult::new(outcome)
    }

    fn target(&self) -> &Url {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(url: &str, timeout_secs: u64) -> ProbeConfig {
        ProbeConfig {
            url: Url::parse(url).unwrap(),
            timeout_secs,
            ..ProbeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_healthy_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .match_header("user-agent", mockito::Matcher::Regex("^http-watchdog/".into()))
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let prober = HttpProber::new(&config_for(&format!("{}/health", server.url()), 5)).unwrap();
        let result = prober.probe().await;

        mock.assert_async().await;
        assert!(result.is_healthy());
        assert_eq!(result.status_code(), 200);
        assert_eq!(result.body(), "OK");
    }

    #[tokio::test]
    async fn test_stale_heartbeat_body_is_preserved() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(500)
            .with_body("HEARTBEAT_STALE")
            .create_async()
            .await;

        let prober = HttpProber::new(&config_for(&format!("{}/health", server.url()), 5)).unwrap();
        let result = prober.probe().await;

        assert_eq!(
            result.outcome,
            ProbeOutcome::HttpError {
                status: 500,
                body: "HEARTBEAT_STALE".into()
            }
        );
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(302)
            .with_header("location", "/elsewhere")
            .create_async()
            .await;

        let prober = HttpProber::new(&config_for(&format!("{}/health", server.url()), 5)).unwrap();
        assert_eq!(prober.probe().await.status_code(), 302);
    }

    #[tokio::test]
    async fn test_stalled_body_is_a_timeout_not_success() {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let prober = HttpProber::new(&config_for(&format!("http://{}/health", addr), 1)).unwrap();
        let result = prober.probe().await;
        server.abort();

        assert_eq!(
            result.outcome,
            ProbeOutcome::Timeout {
                after: Duration::from_secs(1)
            }
        );
        assert_eq!(result.status_code(), 0);
        assert!(!result.is_healthy());
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_status_zero() {
        // Port 9 (discard) is essentially never listening on loopback.
        let prober = HttpProber::new(&config_for("http://127.0.0.1:9/health", 2)).unwrap();
        let result = prober.probe().await;

        assert_eq!(result.status_code(), 0);
        assert!(!result.body().is_empty());
    }
}
