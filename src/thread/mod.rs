//! Live message thread of the active chat.
//!
//! [`Thread`] holds the per-stream state: the cached snapshot shown first,
//! the authoritative history once it arrives, and the inserts pushed by the
//! change feed. Every history fetch carries a [`Token`]; only the latest
//! token issued for the active chat may replace the thread.

use axum::{Router, routing::get};

use crate::chat;
use crate::message::model::MessageDto;
use crate::state::AppState;

mod handler;

pub fn sse<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/sse/chats/{id}", get(handler::stream::open))
        .with_state(s)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(u64);

#[derive(Default)]
pub struct Thread {
    chat: Option<chat::Id>,
    issued: u64,
    latest: Option<Token>,
    messages: Vec<MessageDto>,
    pending: Vec<MessageDto>,
    loaded: bool,
}

impl Thread {
    /// Makes `chat` active, shows its cached snapshot and issues the token
    /// the upcoming history fetch must present.
    pub fn select(&mut self, chat: chat::Id, cached: Option<Vec<MessageDto>>) -> Token {
        self.issued += 1;
        let token = Token(self.issued);

        self.chat = Some(chat);
        self.latest = Some(token);
        self.messages = cached.unwrap_or_default();
        self.pending.clear();
        self.loaded = false;

        token
    }

    /// Replaces the thread with an authoritative history. Returns `false`
    /// when the result is stale and was discarded.
    pub fn apply_fetch(&mut self, chat: &chat::Id, token: Token, history: Vec<MessageDto>) -> bool {
        if self.chat.as_ref() != Some(chat) || self.latest != Some(token) {
            return false;
        }

        self.messages = history;
        self.settle();

        true
    }

    /// Gives up on the authoritative history and keeps the cached snapshot,
    /// merged with the inserts buffered so far.
    pub fn settle(&mut self) {
        for msg in std::mem::take(&mut self.pending) {
            if !self.contains(&msg) {
                self.messages.push(msg);
            }
        }
        self.loaded = true;
    }

    /// Accepts a change feed insert. Returns the message when it should be
    /// appended to the rendered thread right away.
    pub fn on_insert(&mut self, msg: MessageDto) -> Option<&MessageDto> {
        if self.chat.as_ref() != Some(msg.chat_id()) {
            return None;
        }

        if !self.loaded {
            if !self.pending.iter().any(|m| m.id() == msg.id()) {
                self.pending.push(msg);
            }
            return None;
        }

        if self.contains(&msg) {
            return None;
        }
        self.messages.push(msg);
        self.messages.last()
    }

    pub fn messages(&self) -> &[MessageDto] {
        &self.messages
    }

    fn contains(&self, msg: &MessageDto) -> bool {
        self.messages.iter().any(|m| m.id() == msg.id())
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::message::Id;
    use crate::user;

    fn chat_id(n: u128) -> chat::Id {
        chat::Id::from(Uuid::from_u128(n))
    }

    fn msg(id: u128, chat: u128, content: &str) -> MessageDto {
        MessageDto::new(
            Id::from(Uuid::from_u128(id)),
            chat_id(chat),
            user::Id::from(Uuid::nil()),
            content,
            id as i64,
        )
    }

    fn contents(thread: &Thread) -> Vec<&str> {
        thread.messages().iter().map(|m| m.content()).collect()
    }

    #[test]
    fn should_show_cached_snapshot_on_select() {
        let mut thread = Thread::default();

        thread.select(chat_id(1), Some(vec![msg(1, 1, "cached")]));

        assert_eq!(contents(&thread), vec!["cached"]);
    }

    #[test]
    fn should_issue_monotonic_tokens() {
        let mut thread = Thread::default();

        let first = thread.select(chat_id(1), None);
        let second = thread.select(chat_id(1), None);

        assert!(second > first);
    }

    #[test]
    fn should_discard_stale_fetch() {
        let mut thread = Thread::default();
        let stale = thread.select(chat_id(1), None);
        let latest = thread.select(chat_id(1), None);

        assert!(thread.apply_fetch(&chat_id(1), latest, vec![msg(2, 1, "fresh")]));
        assert!(!thread.apply_fetch(&chat_id(1), stale, vec![msg(1, 1, "old")]));

        assert_eq!(contents(&thread), vec!["fresh"]);
    }

    #[test]
    fn should_discard_fetch_of_previous_chat() {
        let mut thread = Thread::default();
        let token = thread.select(chat_id(1), None);
        thread.select(chat_id(2), None);

        assert!(!thread.apply_fetch(&chat_id(1), token, vec![msg(1, 1, "old chat")]));
        assert!(thread.messages().is_empty());
    }

    #[test]
    fn should_ignore_insert_for_other_chat() {
        let mut thread = Thread::default();
        let token = thread.select(chat_id(1), None);
        thread.apply_fetch(&chat_id(1), token, vec![]);

        assert!(thread.on_insert(msg(1, 2, "elsewhere")).is_none());
        assert!(thread.messages().is_empty());
    }

    #[test]
    fn should_append_insert_exactly_once() {
        let mut thread = Thread::default();
        let token = thread.select(chat_id(1), None);
        thread.apply_fetch(&chat_id(1), token, vec![msg(1, 1, "hello")]);

        assert_eq!(
            thread.on_insert(msg(2, 1, "hi")).map(MessageDto::content),
            Some("hi")
        );
        assert!(thread.on_insert(msg(2, 1, "hi")).is_none());

        assert_eq!(contents(&thread), vec!["hello", "hi"]);
    }

    #[test]
    fn should_merge_inserts_received_before_fetch() {
        let mut thread = Thread::default();
        let token = thread.select(chat_id(1), None);

        assert!(thread.on_insert(msg(2, 1, "early")).is_none());
        assert!(thread.on_insert(msg(3, 1, "racing")).is_none());
        assert!(thread.on_insert(msg(3, 1, "racing")).is_none());

        thread.apply_fetch(
            &chat_id(1),
            token,
            vec![msg(1, 1, "hello"), msg(2, 1, "early")],
        );

        assert_eq!(contents(&thread), vec!["hello", "early", "racing"]);
    }

    #[test]
    fn should_keep_cached_snapshot_and_live_inserts_after_failed_fetch() {
        let mut thread = Thread::default();
        thread.select(chat_id(1), Some(vec![msg(1, 1, "cached")]));
        thread.on_insert(msg(2, 1, "live"));

        thread.settle();

        assert_eq!(contents(&thread), vec!["cached", "live"]);
        assert_eq!(
            thread.on_insert(msg(3, 1, "later")).map(MessageDto::content),
            Some("later")
        );
    }
}
