use diesel::ExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;

use crate::chat;
use crate::integration::db::Pool;
use crate::schema::messages;

use super::model::{Message, NewMessage};

pub trait MessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message>;

    /// Full history of a chat, oldest first.
    fn find_by_chat(&self, chat_id: &chat::Id) -> super::Result<Vec<Message>>;

    /// Every message of the given chats, newest first.
    fn find_by_chats(&self, chat_ids: &[chat::Id]) -> super::Result<Vec<Message>>;
}

pub struct PgMessageRepository {
    pool: Pool,
}

impl PgMessageRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for PgMessageRepository {
    fn insert(&self, m: &NewMessage) -> super::Result<Message> {
        let mut conn = self.pool.get()?;

        let msg = diesel::insert_into(messages::table)
            .values(m)
            .returning(Message::as_returning())
            .get_result(&mut conn)?;

        Ok(msg)
    }

    fn find_by_chat(&self, chat_id: &chat::Id) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let msgs = messages::table
            .filter(messages::chat_id.eq(chat_id.get()))
            .order(messages::created_at.asc())
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(msgs)
    }

    fn find_by_chats(&self, chat_ids: &[chat::Id]) -> super::Result<Vec<Message>> {
        let mut conn = self.pool.get()?;

        let ids = chat_ids.iter().map(|id| *id.get()).collect::<Vec<_>>();
        let msgs = messages::table
            .filter(messages::chat_id.eq_any(ids))
            .order(messages::created_at.desc())
            .select(Message::as_select())
            .load(&mut conn)?;

        Ok(msgs)
    }
}

#[cfg(test)]
mod test {
    use diesel::RunQueryDsl;
    use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};
    use uuid::Uuid;

    use super::*;
    use crate::chat::model::NewChat;
    use crate::integration::db;
    use crate::message::model::MessageDto;
    use crate::schema::chats;
    use crate::user;

    fn create_chat(pool: &Pool, owner: &user::Id) -> chat::Id {
        let mut conn = pool.get().unwrap();
        let id: Uuid = diesel::insert_into(chats::table)
            .values(NewChat::new(owner, "Team", false, ""))
            .returning(chats::id)
            .get_result(&mut conn)
            .unwrap();
        chat::Id::from(id)
    }

    #[tokio::test]
    async fn should_return_history_oldest_first() {
        let node = Postgres::default().start().await.unwrap();
        let pool = db::test::pool(&node).await;
        let repo = PgMessageRepository::new(pool.clone());

        let sender = user::Id::from(Uuid::new_v4());
        let chat_id = create_chat(&pool, &sender);
        repo.insert(&NewMessage::new(&chat_id, &sender, "first", None))
            .unwrap();
        repo.insert(&NewMessage::new(&chat_id, &sender, "second", None))
            .unwrap();

        let history = repo.find_by_chat(&chat_id).unwrap();

        let contents = history
            .into_iter()
            .map(MessageDto::from)
            .map(|m| m.content().to_string())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn should_return_messages_of_many_chats_newest_first() {
        let node = Postgres::default().start().await.unwrap();
        let pool = db::test::pool(&node).await;
        let repo = PgMessageRepository::new(pool.clone());

        let sender = user::Id::from(Uuid::new_v4());
        let c1 = create_chat(&pool, &sender);
        let c2 = create_chat(&pool, &sender);
        let c3 = create_chat(&pool, &sender);
        repo.insert(&NewMessage::new(&c1, &sender, "one", None)).unwrap();
        repo.insert(&NewMessage::new(&c2, &sender, "two", None)).unwrap();
        repo.insert(&NewMessage::new(&c3, &sender, "three", None)).unwrap();

        let msgs = repo.find_by_chats(&[c1, c2]).unwrap();

        let contents = msgs
            .into_iter()
            .map(MessageDto::from)
            .map(|m| m.content().to_string())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn should_store_attachment_url() {
        let node = Postgres::default().start().await.unwrap();
        let pool = db::test::pool(&node).await;
        let repo = PgMessageRepository::new(pool.clone());

        let sender = user::Id::from(Uuid::new_v4());
        let chat_id = create_chat(&pool, &sender);

        let msg = repo
            .insert(&NewMessage::new(
                &chat_id,
                &sender,
                "",
                Some("http://minio/attachments/1-cat.png".into()),
            ))
            .map(MessageDto::from)
            .unwrap();

        assert_eq!(
            msg.attachment_url(),
            Some("http://minio/attachments/1-cat.png")
        );
        assert!(!msg.seen());
        assert!(!msg.delivered());
    }
}
