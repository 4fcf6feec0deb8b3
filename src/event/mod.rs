use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::message::model::MessageDto;

pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::EventService + Send + Sync>;

/// Change feed channels.
#[derive(Clone, Debug, PartialEq)]
pub enum Subject {
    MessageInserts,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MessageInserted { message: MessageDto },
}

pub type EventStream = Pin<Box<dyn Stream<Item = Event> + Send>>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Subscribe(#[from] async_nats::SubscribeError),
    #[error(transparent)]
    _Publish(#[from] async_nats::PublishError),
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::{chat, message, user};

    #[test]
    fn should_tag_event_with_type() {
        let event = Event::MessageInserted {
            message: MessageDto::new(
                message::Id::from(Uuid::nil()),
                chat::Id::from(Uuid::nil()),
                user::Id::from(Uuid::nil()),
                "hi",
                0,
            ),
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "message_inserted");
        assert_eq!(json["message"]["content"], "hi");
    }
}
