use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, warn};
use uuid::Uuid;

use crate::event::{self, Event, Subject};
use crate::integration::cache::Key;
use crate::integration::storage;
use crate::snapshot::Snapshots;
use crate::{auth, chat};

use super::model::{Draft, MessageDto, NewMessage, Sent};

const MAX_FILE_NAME: usize = 100;

#[async_trait]
pub trait MessageService {
    /// Last known history of a chat, for first paint.
    async fn cached(&self, chat_id: &chat::Id) -> Option<Vec<MessageDto>>;

    /// Authoritative history of a chat, oldest first.
    async fn history(&self, chat_id: &chat::Id) -> super::Result<Vec<MessageDto>>;

    async fn remember(&self, chat_id: &chat::Id, messages: &[MessageDto]);

    async fn send(&self, sender: &auth::User, draft: Draft) -> super::Result<Sent>;
}

#[derive(Clone)]
pub struct MessageServiceImpl {
    repo: super::Repository,
    chat_repo: chat::Repository,
    storage: storage::Store,
    event_service: event::Service,
    snapshots: Snapshots,
}

impl MessageServiceImpl {
    pub fn new(
        repo: super::Repository,
        chat_repo: chat::Repository,
        storage: storage::Store,
        event_service: event::Service,
        snapshots: Snapshots,
    ) -> Self {
        Self {
            repo,
            chat_repo,
            storage,
            event_service,
            snapshots,
        }
    }

    fn check_member(&self, sender: &auth::User, chat_id: &chat::Id) -> super::Result<()> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .map(chat::model::ChatDto::from)
            .map_err(Box::new)?;

        if !chat.is_member(sender.id()) {
            return Err(Box::new(chat::Error::NotMember).into());
        }
        Ok(())
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn cached(&self, chat_id: &chat::Id) -> Option<Vec<MessageDto>> {
        self.snapshots.peek(Key::Messages(chat_id)).await
    }

    async fn history(&self, chat_id: &chat::Id) -> super::Result<Vec<MessageDto>> {
        let msgs = self
            .repo
            .find_by_chat(chat_id)?
            .into_iter()
            .map(MessageDto::from)
            .collect();
        Ok(msgs)
    }

    async fn remember(&self, chat_id: &chat::Id, messages: &[MessageDto]) {
        self.snapshots.put(Key::Messages(chat_id), &messages).await;
    }

    async fn send(&self, sender: &auth::User, draft: Draft) -> super::Result<Sent> {
        draft.validate()?;
        self.check_member(sender, draft.chat_id())?;

        let mut attachment_url = None;
        let mut upload_error = None;

        if let Some(file) = draft.attachment() {
            let name = object_name(Utc::now().timestamp_millis(), &Uuid::new_v4(), file.name());

            match self
                .storage
                .upload(&name, file.content_type(), file.data())
                .await
            {
                Ok(()) => attachment_url = Some(self.storage.public_url(&name)),
                Err(e) if draft.text().is_empty() => {
                    return Err(super::Error::Upload(e.to_string()));
                }
                Err(e) => {
                    warn!("Sending message without attachment: {e}");
                    upload_error = Some(e.to_string());
                }
            }
        }

        let new_message = NewMessage::new(draft.chat_id(), sender.id(), draft.text(), attachment_url);
        let message = self.repo.insert(&new_message).map(MessageDto::from)?;
        debug!("Inserted message {} into chat {}", message.id(), message.chat_id());

        let event = Event::MessageInserted {
            message: message.clone(),
        };
        if let Err(e) = self
            .event_service
            .publish(&Subject::MessageInserts, &event)
            .await
        {
            error!("Failed to publish message insert: {e}");
        }

        Ok(Sent {
            message,
            upload_error,
        })
    }
}

/// Unique storage name: `{millis}-{uuid}-{sanitized file name}`.
pub fn object_name(millis: i64, uuid: &Uuid, file_name: &str) -> String {
    format!("{millis}-{uuid}-{}", sanitize(file_name))
}

fn sanitize(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let clean = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME)
        .collect::<String>();

    if clean.is_empty() {
        String::from("file")
    } else {
        clean
    }
}
