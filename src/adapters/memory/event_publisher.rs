use crate::domain::events::LoanEvent;
use crate::ports::event_publisher::{EventPublisher as EventPublisherTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-memory implementation of EventPublisher.
///
/// Records published events in order so tests can assert on them.
pub struct RecordingEventPublisher {
    events: Mutex<Vec<LoanEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// All events published so far, in publish order.
    pub fn published(&self) -> Vec<LoanEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for RecordingEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisherTrait for RecordingEventPublisher {
    async fn publish(&self, event: &LoanEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
