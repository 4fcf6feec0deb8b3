use bytes::Bytes;
use chrono::NaiveDateTime;
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{chat, user};

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Message {
    id: Uuid,
    chat_id: Uuid,
    sender_id: Uuid,
    content: String,
    attachment_url: Option<String>,
    created_at: NaiveDateTime,
    delivered: bool,
    seen: bool,
}

#[cfg(test)]
impl Message {
    pub fn fake(m: &NewMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id: m.chat_id,
            sender_id: m.sender_id,
            content: m.content.clone(),
            attachment_url: m.attachment_url.clone(),
            created_at: chrono::Utc::now().naive_utc(),
            delivered: false,
            seen: false,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::messages)]
pub struct NewMessage {
    chat_id: Uuid,
    sender_id: Uuid,
    content: String,
    attachment_url: Option<String>,
}

impl NewMessage {
    pub fn new(
        chat_id: &chat::Id,
        sender_id: &user::Id,
        content: &str,
        attachment_url: Option<String>,
    ) -> Self {
        Self {
            chat_id: *chat_id.get(),
            sender_id: *sender_id.get(),
            content: content.to_string(),
            attachment_url,
        }
    }

    #[cfg(test)]
    pub fn parts(&self) -> (&str, Option<&str>) {
        (&self.content, self.attachment_url.as_deref())
    }
}

/// Message as rendered, cached and carried over the change feed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MessageDto {
    id: Id,
    chat_id: chat::Id,
    sender_id: user::Id,
    content: String,
    attachment_url: Option<String>,
    /// Milliseconds since the Unix epoch.
    created_at: i64,
    delivered: bool,
    seen: bool,
}

impl MessageDto {
    pub fn new(
        id: Id,
        chat_id: chat::Id,
        sender_id: user::Id,
        content: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            content: content.into(),
            attachment_url: None,
            created_at,
            delivered: false,
            seen: false,
        }
    }

    pub fn with_attachment(mut self, url: impl Into<String>) -> Self {
        self.attachment_url = Some(url.into());
        self
    }

    pub fn with_seen(mut self, seen: bool) -> Self {
        self.seen = seen;
        self
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub const fn chat_id(&self) -> &chat::Id {
        &self.chat_id
    }

    pub const fn sender_id(&self) -> &user::Id {
        &self.sender_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn attachment_url(&self) -> Option<&str> {
        self.attachment_url.as_deref()
    }

    pub const fn created_at(&self) -> i64 {
        self.created_at
    }

    pub const fn delivered(&self) -> bool {
        self.delivered
    }

    pub const fn seen(&self) -> bool {
        self.seen
    }
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: Id::from(m.id),
            chat_id: chat::Id::from(m.chat_id),
            sender_id: user::Id::from(m.sender_id),
            content: m.content,
            attachment_url: m.attachment_url,
            created_at: m.created_at.and_utc().timestamp_millis(),
            delivered: m.delivered,
            seen: m.seen,
        }
    }
}

/// File picked in the composer.
pub struct Attachment {
    name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl Attachment {
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> Bytes {
        self.data.clone()
    }
}

/// Outbound message as submitted by the composer form.
pub struct Draft {
    chat_id: chat::Id,
    text: String,
    attachment: Option<Attachment>,
}

impl Draft {
    pub fn new(chat_id: chat::Id, text: impl Into<String>, attachment: Option<Attachment>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            attachment: attachment.filter(|a| !a.name.is_empty() && !a.data.is_empty()),
        }
    }

    pub const fn chat_id(&self) -> &chat::Id {
        &self.chat_id
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Rejects drafts with neither text nor a file.
    pub fn validate(&self) -> super::Result<()> {
        if self.text().is_empty() && self.attachment.is_none() {
            return Err(super::Error::Empty);
        }
        Ok(())
    }
}

/// Outcome of a send. The message went out even when the attachment
/// upload failed, in which case `upload_error` explains why it is missing.
pub struct Sent {
    pub message: MessageDto,
    pub upload_error: Option<String>,
}
