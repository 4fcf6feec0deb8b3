use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, error};

use super::{Event, EventStream, Subject};

#[async_trait]
pub trait EventService {
    /// Opens a subscription. Dropping the returned stream releases it.
    async fn subscribe(&self, subject: &Subject) -> super::Result<EventStream>;

    async fn publish(&self, subject: &Subject, event: &Event) -> super::Result<()>;
}

#[derive(Clone)]
pub struct NatsEventService {
    pubsub: async_nats::Client,
}

impl NatsEventService {
    pub fn new(pubsub: async_nats::Client) -> Self {
        Self { pubsub }
    }
}

#[async_trait]
impl EventService for NatsEventService {
    async fn subscribe(&self, subject: &Subject) -> super::Result<EventStream> {
        let subscriber = self.pubsub.subscribe(subject).await?;
        debug!("Subscribed to {subject}");

        let stream = subscriber.filter_map(|msg| async move {
            match serde_json::from_slice::<Event>(&msg.payload) {
                Ok(event) => Some(event),
                Err(e) => {
                    error!("Failed to deserialize event: {e:?}");
                    None
                }
            }
        });

        Ok(Box::pin(stream))
    }

    async fn publish(&self, subject: &Subject, event: &Event) -> super::Result<()> {
        self.pubsub.publish(subject, event.into()).await?;
        Ok(())
    }
}
