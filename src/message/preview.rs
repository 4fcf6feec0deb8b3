use std::collections::HashMap;

use crate::chat;

use super::model::MessageDto;

/// Keeps the first message seen per chat; the input is expected newest
/// first, so that is the latest one.
pub fn latest_per_chat(newest_first: Vec<MessageDto>) -> HashMap<chat::Id, MessageDto> {
    let mut latest = HashMap::new();
    for msg in newest_first {
        latest.entry(msg.chat_id().clone()).or_insert(msg);
    }
    latest
}

/// Latest message of each given chat, fetched with a single query.
pub fn previews(
    repo: &super::Repository,
    chat_ids: &[chat::Id],
) -> super::Result<HashMap<chat::Id, MessageDto>> {
    if chat_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let newest_first = repo
        .find_by_chats(chat_ids)?
        .into_iter()
        .map(MessageDto::from)
        .collect();

    Ok(latest_per_chat(newest_first))
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::message::model::{Message, NewMessage};
    use crate::message::repository::MessageRepository;
    use crate::message::{self, Id};
    use crate::user;

    #[derive(Default)]
    struct CountingRepo {
        calls: AtomicUsize,
    }

    impl MessageRepository for CountingRepo {
        fn insert(&self, _: &NewMessage) -> message::Result<Message> {
            unimplemented!()
        }

        fn find_by_chat(&self, _: &chat::Id) -> message::Result<Vec<Message>> {
            unimplemented!()
        }

        fn find_by_chats(&self, _: &[chat::Id]) -> message::Result<Vec<Message>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    fn msg(id: u128, chat: u128, content: &str, at: i64) -> MessageDto {
        MessageDto::new(
            Id::from(Uuid::from_u128(id)),
            chat::Id::from(Uuid::from_u128(chat)),
            user::Id::from(Uuid::nil()),
            content,
            at,
        )
    }

    #[test]
    fn should_keep_latest_message_per_chat() {
        let newest_first = vec![
            msg(4, 1, "latest in 1", 40),
            msg(3, 2, "latest in 2", 30),
            msg(2, 1, "older in 1", 20),
            msg(1, 2, "older in 2", 10),
        ];

        let latest = latest_per_chat(newest_first);

        assert_eq!(latest.len(), 2);
        assert_eq!(
            latest[&chat::Id::from(Uuid::from_u128(1))].content(),
            "latest in 1"
        );
        assert_eq!(
            latest[&chat::Id::from(Uuid::from_u128(2))].content(),
            "latest in 2"
        );
    }

    #[test]
    fn should_skip_query_without_chats() {
        let counting = Arc::new(CountingRepo::default());
        let repo: message::Repository = counting.clone();

        let previews = previews(&repo, &[]).unwrap();

        assert!(previews.is_empty());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_query_once_for_many_chats() {
        let counting = Arc::new(CountingRepo::default());
        let repo: message::Repository = counting.clone();
        let ids = [
            chat::Id::from(Uuid::from_u128(1)),
            chat::Id::from(Uuid::from_u128(2)),
        ];

        previews(&repo, &ids).unwrap();

        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }
}
