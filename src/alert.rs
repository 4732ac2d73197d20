//! Slack alerting for gateway errors.
//!
//! [`SlackNotifier`] posts `{"text": ...}` to an incoming-webhook URL on
//! a detached task using the shared HTTP client. At most one alert is
//! sent per interval; alerts raised inside the window are counted and
//! reported with the next one that goes out.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::{header, Method};
use bytes::Bytes;
use http_body_util::Full;

use crate::error::GatewayError;
use crate::server::HttpClient;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Window {
    last_sent: Option<Instant>,
    suppressed: u64,
}

impl Window {
    /// Decide whether an alert raised at `now` goes out. Returns the number
    /// of alerts suppressed since the last one sent.
    fn admit(&mut self, now: Instant, interval: Duration) -> Option<u64> {
        let open = self
            .last_sent
            .map_or(true, |last| now.saturating_duration_since(last) >= interval);
        if open {
            self.last_sent = Some(now);
            Some(std::mem::take(&mut self.suppressed))
        } else {
            self.suppressed += 1;
            None
        }
    }
}

pub struct SlackNotifier {
    client: HttpClient,
    webhook: hyper::Uri,
    interval: Duration,
    window: Mutex<Window>,
}

impl SlackNotifier {
    pub fn new(client: HttpClient, webhook_url: &str, interval: Duration) -> Result<Self, GatewayError> {
        let webhook = webhook_url
            .parse::<hyper::Uri>()
            .map_err(|e| GatewayError::UriParse {
                source: Box::new(e),
            })?;
        Ok(Self {
            client,
            webhook,
            interval,
            window: Mutex::new(Window::default()),
        })
    }

    /// Queue an alert. Returns `false` when it was throttled.
    pub fn notify(&self, text: &str) -> bool {
        let admitted = match self.window.lock() {
            Ok(mut window) => window.admit(Instant::now(), self.interval),
            Err(_) => return false,
        };
        let Some(suppressed) = admitted else {
            return false;
        };

        let text = if suppressed > 0 {
            format!("{text}\n_{suppressed} similar alerts suppressed_")
        } else {
            text.to_string()
        };
        let payload = serde_json::json!({ "text": text }).to_string();

        let request = match hyper::Request::builder()
            .method(Method::POST)
            .uri(self.webhook.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(payload)))
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "failed to build Slack alert");
                return false;
            }
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(WEBHOOK_TIMEOUT, client.request(request)).await {
                Ok(Ok(resp)) if resp.status().is_success() => {
                    tracing::debug!("Slack alert delivered");
                }
                Ok(Ok(resp)) => {
                    tracing::warn!(status = resp.status().as_u16(), "Slack webhook rejected alert");
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "Slack alert failed"),
                Err(_) => tracing::warn!("Slack alert timed out"),
            }
        });
        true
    }
}
