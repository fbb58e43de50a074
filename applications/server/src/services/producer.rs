/// Message broker publishing
///
/// Notifications (OTP e-mails, playlist exports) are handed to a broker and
/// never awaited by the request that triggered them.
use crate::{config::BrokerSettings, error::{Result, ServerError}};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Verification code e-mail: `{userId, email, otp}`
pub const ROUTE_AUTH_VERIFY: &str = "auth:verify";

/// Password reset e-mail: `{userId, username, email, otp}`
pub const ROUTE_AUTH_FORGOT: &str = "auth:forgot";

/// Playlist export request: `{playlistId, targetEmail}`
pub const ROUTE_EXPORT_PLAYLIST: &str = "export:playlist";

#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send(&self, routing_key: &str, payload: &Value) -> Result<()>;
}

/// Publishes through the RabbitMQ management HTTP API
pub struct RabbitMqProducer {
    client: reqwest::Client,
    publish_url: String,
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    routed: bool,
}

impl RabbitMqProducer {
    pub fn new(base_url: &str, settings: &BrokerSettings) -> Self {
        let vhost = settings.vhost.replace('/', "%2F");
        Self {
            client: reqwest::Client::new(),
            publish_url: format!(
                "{}/api/exchanges/{}/{}/publish",
                base_url.trim_end_matches('/'),
                vhost,
                settings.exchange
            ),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    pub fn publish_url(&self) -> &str {
        &self.publish_url
    }
}

#[async_trait]
impl MessageProducer for RabbitMqProducer {
    async fn send(&self, routing_key: &str, payload: &Value) -> Result<()> {
        let body = json!({
            "properties": { "delivery_mode": 2 },
            "routing_key": routing_key,
            "payload": payload.to_string(),
            "payload_encoding": "string",
        });

        let response = self
            .client
            .post(&self.publish_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServerError::Internal(format!("broker publish failed: {e}")))?;

        let result: PublishResponse = response
            .json()
            .await
            .map_err(|e| ServerError::Internal(format!("broker response: {e}")))?;

        if !result.routed {
            tracing::warn!(routing_key, "Message was not routed to any queue");
        }
        Ok(())
    }
}

/// Used when no broker is configured: messages only go to the log
pub struct LogProducer;

#[async_trait]
impl MessageProducer for LogProducer {
    async fn send(&self, routing_key: &str, payload: &Value) -> Result<()> {
        tracing::info!(routing_key, %payload, "Broker disabled, message dropped");
        Ok(())
    }
}

/// Build the producer for the configured broker
pub fn from_settings(settings: &BrokerSettings) -> Arc<dyn MessageProducer> {
    match settings.url.as_deref() {
        Some(url) => Arc::new(RabbitMqProducer::new(url, settings)),
        None => Arc::new(LogProducer),
    }
}

/// Fire-and-forget publish; failures are logged and never retried
pub fn publish(producer: &Arc<dyn MessageProducer>, routing_key: &'static str, payload: Value) {
    let producer = Arc::clone(producer);
    tokio::spawn(async move {
        if let Err(e) = producer.send(routing_key, &payload).await {
            tracing::error!(routing_key, "Failed to publish message: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_url_encodes_vhost() {
        let settings = BrokerSettings {
            url: Some("http://rabbit:15672/".to_string()),
            vhost: "/".to_string(),
            exchange: "amq.default".to_string(),
            username: "guest".to_string(),
            password: "guest".to_string(),
        };
        let producer = RabbitMqProducer::new("http://rabbit:15672/", &settings);

        assert_eq!(
            producer.publish_url(),
            "http://rabbit:15672/api/exchanges/%2F/amq.default/publish"
        );
    }

    #[tokio::test]
    async fn log_producer_accepts_everything() {
        let producer = LogProducer;
        producer
            .send(ROUTE_EXPORT_PLAYLIST, &json!({"playlistId": "playlist-1"}))
            .await
            .unwrap();
    }
}
