use chrono::NaiveDateTime;
use diesel::prelude::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::model::MessageDto;
use crate::user;

use super::Id;

#[derive(Queryable, Selectable, Clone, Debug, PartialEq)]
#[diesel(table_name = crate::schema::chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chat {
    id: Uuid,
    chat_name: String,
    is_group: bool,
    members: Vec<Uuid>,
    labels: Vec<String>,
    created_at: NaiveDateTime,
}

impl Chat {
    pub const fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn members(&self) -> &[Uuid] {
        &self.members
    }

    #[cfg(test)]
    pub fn fake(id: &Id, members: &[user::Id]) -> Self {
        Self {
            id: *id.get(),
            chat_name: String::from("Team"),
            is_group: members.len() > 2,
            members: members.iter().map(|m| *m.get()).collect(),
            labels: vec![],
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::chats)]
pub struct NewChat {
    chat_name: String,
    is_group: bool,
    members: Vec<Uuid>,
    labels: Vec<String>,
}

impl NewChat {
    /// The creator is the only initial member.
    pub fn new(creator: &user::Id, chat_name: &str, is_group: bool, labels: &str) -> Self {
        Self {
            chat_name: chat_name.trim().to_string(),
            is_group,
            members: vec![*creator.get()],
            labels: parse_labels(labels),
        }
    }

    pub fn chat_name(&self) -> &str {
        &self.chat_name
    }

    #[cfg(test)]
    pub fn into_chat(self, id: Uuid) -> Chat {
        Chat {
            id,
            chat_name: self.chat_name,
            is_group: self.is_group,
            members: self.members,
            labels: self.labels,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Splits a comma separated label string, dropping blanks.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Chat as rendered and cached, with the preview of its latest message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatDto {
    id: Id,
    chat_name: String,
    is_group: bool,
    members: Vec<user::Id>,
    labels: Vec<String>,
    last_message: Option<MessageDto>,
}

impl ChatDto {
    pub fn new(
        id: Id,
        chat_name: impl Into<String>,
        is_group: bool,
        members: Vec<user::Id>,
        labels: Vec<String>,
    ) -> Self {
        Self {
            id,
            chat_name: chat_name.into(),
            is_group,
            members,
            labels,
            last_message: None,
        }
    }

    pub const fn id(&self) -> &Id {
        &self.id
    }

    pub fn chat_name(&self) -> &str {
        &self.chat_name
    }

    pub const fn is_group(&self) -> bool {
        self.is_group
    }

    pub fn members(&self) -> &[user::Id] {
        &self.members
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub const fn last_message(&self) -> Option<&MessageDto> {
        self.last_message.as_ref()
    }

    pub fn is_member(&self, user_id: &user::Id) -> bool {
        self.members.contains(user_id)
    }

    pub fn with_last_message(mut self, msg: Option<MessageDto>) -> Self {
        self.last_message = msg;
        self
    }
}

impl From<Chat> for ChatDto {
    fn from(c: Chat) -> Self {
        Self::new(
            Id::from(c.id),
            c.chat_name,
            c.is_group,
            c.members.into_iter().map(user::Id::from).collect(),
            c.labels,
        )
    }
}
