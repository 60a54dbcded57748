//! Cloud Synchronization Module
//!
//! Publishes finished session summaries to an MQTT broker as JSON
//! envelopes on `{topic_prefix}/{user}/summary`. The publisher drives its
//! own event loop: `connect` returns once the broker acknowledged the
//! connection and `publish_summary` once the summary was acknowledged
//! (QoS 1). Callers log failures and carry on.

use chrono::{DateTime, Utc};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use serde::{Deserialize, Serialize};
use session::SessionSummary;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Cloud sync error types
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Cloud sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Publish summaries at all
    pub enabled: bool,
    /// MQTT broker host
    pub broker_host: String,
    /// MQTT port
    pub broker_port: u16,
    /// MQTT client id
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// First topic segment
    pub topic_prefix: String,
    /// How long to wait for ConnAck / PubAck
    pub ack_timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "study-focus".to_string(),
            keep_alive_secs: 30,
            topic_prefix: "sessions".to_string(),
            ack_timeout_secs: 10,
        }
    }
}

/// Summary message for the broker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMessage {
    pub message_type: String,
    pub message_id: Uuid,
    pub sent_at: DateTime<Utc>,
    pub user: String,
    pub summary: SessionSummary,
}

impl SummaryMessage {
    pub fn new(summary: SessionSummary) -> Self {
        Self {
            message_type: "session_summary".to_string(),
            message_id: Uuid::new_v4(),
            sent_at: Utc::now(),
            user: user_key(&summary).to_string(),
            summary,
        }
    }
}

/// Topic segment for a summary: user id, else username, else "anonymous"
pub fn user_key(summary: &SessionSummary) -> &str {
    summary
        .user_id
        .as_deref()
        .or(summary.username.as_deref())
        .unwrap_or("anonymous")
}

/// Client handle plus the event loop that actually moves packets
struct Connection {
    client: AsyncClient,
    eventloop: EventLoop,
}

/// Summary publisher
pub struct SummaryPublisher {
    config: CloudConfig,
    connection: Option<Connection>,
}

impl SummaryPublisher {
    pub fn new(config: CloudConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Connect to the MQTT broker and wait for its ConnAck
    pub async fn connect(&mut self) -> Result<(), CloudError> {
        if self.config.broker_host.is_empty() {
            return Err(CloudError::Connection("Empty broker host".to_string()));
        }

        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.broker_host.clone(),
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs.max(5)));

        let (client, mut eventloop) = AsyncClient::new(options, 10);

        let mut refused = None;
        poll_until(&mut eventloop, self.ack_timeout(), |event| match event {
            Event::Incoming(Packet::ConnAck(ack)) => {
                if ack.code != ConnectReturnCode::Success {
                    refused = Some(ack.code);
                }
                true
            }
            _ => false,
        })
        .await
        .map_err(CloudError::Connection)?;

        if let Some(code) = refused {
            return Err(CloudError::Connection(format!("Broker refused: {:?}", code)));
        }

        self.connection = Some(Connection { client, eventloop });
        info!(
            "Connected to MQTT broker: {}:{}",
            self.config.broker_host, self.config.broker_port
        );
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn topic_for(&self, summary: &SessionSummary) -> String {
        format!("{}/{}/summary", self.config.topic_prefix, user_key(summary))
    }

    /// Publish one summary (QoS 1) and wait for the broker's PubAck
    pub async fn publish_summary(&mut self, summary: &SessionSummary) -> Result<(), CloudError> {
        let timeout = self.ack_timeout();
        let topic = self.topic_for(summary);
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| CloudError::Connection("Not connected".to_string()))?;

        let payload = encode(&SummaryMessage::new(summary.clone()))?;
        connection
            .client
            .publish(&topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(|e| CloudError::Publish(e.to_string()))?;

        let mut pkid = None;
        let acked = poll_until(&mut connection.eventloop, timeout, |event| match event {
            Event::Outgoing(Outgoing::Publish(id)) => {
                pkid = Some(*id);
                false
            }
            Event::Incoming(Packet::PubAck(ack)) => pkid == Some(ack.pkid),
            _ => false,
        })
        .await;

        if let Err(e) = acked {
            // Event loop state is unknown after a failure
            self.connection = None;
            return Err(CloudError::Publish(e));
        }

        info!("Published session {} to {}", summary.session_id, topic);
        Ok(())
    }

    /// Close the connection, if any
    pub async fn disconnect(&mut self) -> Result<(), CloudError> {
        let timeout = self.ack_timeout();
        if let Some(mut connection) = self.connection.take() {
            connection
                .client
                .disconnect()
                .await
                .map_err(|e| CloudError::Connection(e.to_string()))?;
            if let Err(e) = poll_until(&mut connection.eventloop, timeout, |event| {
                matches!(event, Event::Outgoing(Outgoing::Disconnect))
            })
            .await
            {
                warn!("MQTT disconnect not flushed: {}", e);
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.config.ack_timeout_secs.max(1))
    }
}

/// Drive the event loop until `done` accepts an event. Errors on a
/// connection error or when `timeout` elapses first.
async fn poll_until<F>(eventloop: &mut EventLoop, timeout: Duration, mut done: F) -> Result<(), String>
where
    F: FnMut(&Event) -> bool,
{
    let wait = async {
        loop {
            let event = match eventloop.poll().await {
                Ok(event) => event,
                Err(e) => return Err(e.to_string()),
            };
            debug!("MQTT event: {:?}", event);
            if done(&event) {
                return Ok(());
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .map_err(|_| format!("no acknowledgement within {} s", timeout.as_secs()))?
}

fn encode(message: &SummaryMessage) -> Result<Vec<u8>, CloudError> {
    serde_json::to_vec(message).map_err(|e| CloudError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::{BreakLog, SessionConfig, SessionCounters};

    fn summary(user_id: Option<&str>, username: Option<&str>) -> SessionSummary {
        let config = SessionConfig {
            user_id: user_id.map(String::from),
            username: username.map(String::from),
            ..Default::default()
        };
        SessionSummary::build(&config, 0, &SessionCounters::default(), &BreakLog::default())
    }

    #[test]
    fn test_topic_per_user() {
        let publisher = SummaryPublisher::new(CloudConfig::default());
        assert_eq!(
            publisher.topic_for(&summary(Some("u-1"), Some("ana"))),
            "sessions/u-1/summary"
        );
        assert_eq!(publisher.topic_for(&summary(None, Some("ana"))), "sessions/ana/summary");
        assert_eq!(publisher.topic_for(&summary(None, None)), "sessions/anonymous/summary");
    }

    #[test]
    fn test_message_envelope() {
        let message = SummaryMessage::new(summary(Some("u-1"), None));
        let json: serde_json::Value = serde_json::from_slice(&encode(&message).unwrap()).unwrap();
        assert_eq!(json["message_type"], "session_summary");
        assert_eq!(json["user"], "u-1");
        assert_eq!(json["summary"]["date"], "1970-01-01");
        assert_eq!(json["summary"]["time_per_interval"], 30);
    }

    #[test]
    fn test_config_defaults() {
        let config = CloudConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.ack_timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_and_nothing_is_published() {
        let mut publisher = SummaryPublisher::new(CloudConfig {
            enabled: true,
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1,
            ack_timeout_secs: 2,
            ..Default::default()
        });
        let result = publisher.connect().await;
        assert!(matches!(result, Err(CloudError::Connection(_))));
        assert!(!publisher.is_connected());

        let result = publisher.publish_summary(&summary(Some("u-1"), None)).await;
        assert!(result.is_err());
        assert!(publisher.disconnect().await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_without_connection_fails() {
        let mut publisher = SummaryPublisher::new(CloudConfig::default());
        assert!(!publisher.is_connected());
        let result = publisher.publish_summary(&summary(None, None)).await;
        assert!(matches!(result, Err(CloudError::Connection(_))));
    }

    #[tokio::test]
    async fn test_empty_host_rejected() {
        let mut publisher = SummaryPublisher::new(CloudConfig {
            broker_host: String::new(),
            ..Default::default()
        });
        assert!(publisher.connect().await.is_err());
    }
}
