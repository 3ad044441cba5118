use crate::domain::events::LoanEvent;
use crate::ports::event_publisher::{EventPublisher as EventPublisherTrait, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Kafka implementation of EventPublisher.
///
/// Publishes JSON-serialized loan events to a single topic, keyed by
/// loan id so that all events of one loan land in the same partition and
/// are delivered in publish order. Transport errors are retried with
/// exponential backoff; exhausting the retry budget is logged at error
/// severity before the failure is returned, and callers treat it as
/// fire-and-forget relative to already-committed state.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
    max_attempts: u32,
}

impl KafkaEventPublisher {
    /// Create a publisher connected to `brokers`, writing to `topic`.
    ///
    /// `acks=all` so a record is only acknowledged once every replica has
    /// it, which is what makes the at-least-once guarantee hold across
    /// broker failover.
    pub fn new(brokers: &str, topic: impl Into<String>) -> std::result::Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
            send_timeout: Duration::from_secs(5),
            max_attempts: 5,
        })
    }

    /// Event type discriminator used for logging.
    fn event_type(event: &LoanEvent) -> &'static str {
        match event {
            LoanEvent::Created(_) => "LoanCreated",
            LoanEvent::Returned(_) => "LoanReturned",
            LoanEvent::Overdue(_) => "LoanOverdue",
            LoanEvent::Reminder(_) => "LoanReminder",
        }
    }
}

#[async_trait]
impl EventPublisherTrait for KafkaEventPublisher {
    async fn publish(&self, event: &LoanEvent) -> Result<()> {
        let key = event.loan_id().to_string();
        let payload = serde_json::to_vec(event)?;
        let event_type = Self::event_type(event);

        let mut backoff = Duration::from_millis(100);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

            match self.producer.send(record, self.send_timeout).await {
                Ok((partition, offset)) => {
                    tracing::debug!(event_type, key = %key, partition, offset, "event published");
                    return Ok(());
                }
                Err((e, _)) if attempt < self.max_attempts => {
                    tracing::warn!(
                        event_type,
                        key = %key,
                        attempt,
                        error = %e,
                        "event publish attempt failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err((e, _)) => {
                    tracing::error!(
                        event_type,
                        key = %key,
                        attempts = attempt,
                        error = %e,
                        "giving up on event publish; downstream consumers will miss this event"
                    );
                    return Err(Box::new(e));
                }
            }
        }
    }
}
