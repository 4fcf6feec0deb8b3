use async_trait::async_trait;
use log::debug;

use crate::integration::cache::Key;
use crate::message::{self, preview};
use crate::snapshot::Snapshots;
use crate::user;

use super::Id;
use super::filter::Filter;
use super::model::{ChatDto, NewChat};

#[async_trait]
pub trait ChatService {
    /// Chat list from the last successful reconcile, for first paint.
    async fn cached(&self, owner: &user::Id) -> Option<Vec<ChatDto>>;

    /// Authoritative chat list with previews. Replaces the cached snapshot
    /// on success and leaves it untouched on failure.
    async fn reconcile(&self, owner: &user::Id) -> super::Result<Vec<ChatDto>>;

    async fn create(
        &self,
        owner: &user::Id,
        name: &str,
        is_group: bool,
        labels: &str,
    ) -> super::Result<ChatDto>;

    async fn add_member(
        &self,
        owner: &user::Id,
        id: &Id,
        member: &user::Id,
    ) -> super::Result<ChatDto>;

    async fn find_member_chat(&self, user: &user::Id, id: &Id) -> super::Result<ChatDto>;

    /// Filters the cached snapshot; never reaches the database.
    async fn search(&self, owner: &user::Id, filter: &Filter) -> Vec<ChatDto>;
}

#[derive(Clone)]
pub struct ChatServiceImpl {
    repo: super::Repository,
    message_repo: message::Repository,
    snapshots: Snapshots,
}

impl ChatServiceImpl {
    pub fn new(
        repo: super::Repository,
        message_repo: message::Repository,
        snapshots: Snapshots,
    ) -> Self {
        Self {
            repo,
            message_repo,
            snapshots,
        }
    }
}

#[async_trait]
impl ChatService for ChatServiceImpl {
    async fn cached(&self, owner: &user::Id) -> Option<Vec<ChatDto>> {
        self.snapshots.peek(Key::Chats(owner)).await
    }

    async fn reconcile(&self, owner: &user::Id) -> super::Result<Vec<ChatDto>> {
        self.snapshots
            .read_through(Key::Chats(owner), || async {
                let chats = self.repo.find_by_member(owner)?;
                let ids = chats.iter().map(|c| Id::from(*c.id())).collect::<Vec<_>>();
                let mut previews = preview::previews(&self.message_repo, &ids)?;

                let chats = chats
                    .into_iter()
                    .map(ChatDto::from)
                    .map(|c| {
                        let last = previews.remove(c.id());
                        c.with_last_message(last)
                    })
                    .collect::<Vec<_>>();

                debug!("Loaded {} chats of {owner}", chats.len());
                Ok::<_, super::Error>(chats)
            })
            .await
    }

    async fn create(
        &self,
        owner: &user::Id,
        name: &str,
        is_group: bool,
        labels: &str,
    ) -> super::Result<ChatDto> {
        let new_chat = NewChat::new(owner, name, is_group, labels);
        if new_chat.chat_name().is_empty() {
            return Err(super::Error::MissingName);
        }

        let insert = async { self.repo.insert(new_chat).map(ChatDto::from) };

        self.snapshots
            .write_through(
                Key::Chats(owner),
                insert,
                |current: Option<Vec<ChatDto>>, created: &ChatDto| {
                    let mut next = vec![created.clone()];
                    next.extend(current.unwrap_or_default());
                    next
                },
            )
            .await
    }

    async fn add_member(
        &self,
        owner: &user::Id,
        id: &Id,
        member: &user::Id,
    ) -> super::Result<ChatDto> {
        let loaded = self
            .cached(owner)
            .await
            .and_then(|chats| chats.into_iter().find(|c| c.id() == id));

        let chat = match loaded {
            Some(chat) => chat,
            None => ChatDto::from(self.repo.find_by_id(id)?),
        };

        if !chat.is_member(owner) {
            return Err(super::Error::NotMember);
        }
        if chat.is_member(member) {
            return Err(super::Error::AlreadyMember);
        }

        let mut members = chat.members().to_vec();
        members.push(member.clone());
        let last = chat.last_message().cloned();

        let update = async {
            self.repo
                .update_members(id, &members)
                .map(ChatDto::from)
                .map(|c| c.with_last_message(last))
        };

        self.snapshots
            .write_through(
                Key::Chats(owner),
                update,
                |current: Option<Vec<ChatDto>>, updated: &ChatDto| {
                    current
                        .unwrap_or_default()
                        .into_iter()
                        .map(|c| if c.id() == updated.id() { updated.clone() } else { c })
                        .collect()
                },
            )
            .await
    }

    async fn find_member_chat(&self, user: &user::Id, id: &Id) -> super::Result<ChatDto> {
        let chat = self.repo.find_by_id(id).map(ChatDto::from)?;

        if !chat.is_member(user) {
            return Err(super::Error::NotMember);
        }
        Ok(chat)
    }

    async fn search(&self, owner: &user::Id, filter: &Filter) -> Vec<ChatDto> {
        self.cached(owner)
            .await
            .map(|chats| filter.apply(&chats))
            .unwrap_or_default()
    }
}
