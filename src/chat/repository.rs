use diesel::ExpressionMethods;
use diesel::OptionalExtension;
use diesel::PgArrayExpressionMethods;
use diesel::QueryDsl;
use diesel::RunQueryDsl;
use diesel::SelectableHelper;

use crate::integration::db::Pool;
use crate::schema::chats;
use crate::user;

use super::Id;
use super::model::{Chat, NewChat};

pub trait ChatRepository {
    /// Chats whose member list contains the given user, newest first.
    fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Chat>>;

    fn find_by_id(&self, id: &Id) -> super::Result<Chat>;

    fn insert(&self, c: NewChat) -> super::Result<Chat>;

    fn update_members(&self, id: &Id, members: &[user::Id]) -> super::Result<Chat>;
}

pub struct PgChatRepository {
    pool: Pool,
}

impl PgChatRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl ChatRepository for PgChatRepository {
    fn find_by_member(&self, member: &user::Id) -> super::Result<Vec<Chat>> {
        let mut conn = self.pool.get()?;

        let chats = chats::table
            .filter(chats::members.contains(vec![*member.get()]))
            .order(chats::created_at.desc())
            .select(Chat::as_select())
            .load(&mut conn)?;

        Ok(chats)
    }

    fn find_by_id(&self, id: &Id) -> super::Result<Chat> {
        let mut conn = self.pool.get()?;

        chats::table
            .find(id.get())
            .select(Chat::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| super::Error::NotFound(id.clone()))
    }

    fn insert(&self, c: NewChat) -> super::Result<Chat> {
        let mut conn = self.pool.get()?;

        let chat = diesel::insert_into(chats::table)
            .values(c)
            .returning(Chat::as_returning())
            .get_result(&mut conn)?;

        Ok(chat)
    }

    fn update_members(&self, id: &Id, members: &[user::Id]) -> super::Result<Chat> {
        let mut conn = self.pool.get()?;

        let members = members.iter().map(|m| *m.get()).collect::<Vec<_>>();

        diesel::update(chats::table.find(id.get()))
            .set(chats::members.eq(members))
            .returning(Chat::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| super::Error::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod test {
    use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};
    use uuid::Uuid;

    use super::*;
    use crate::integration::db;

    fn user() -> user::Id {
        user::Id::from(Uuid::new_v4())
    }

    #[tokio::test]
    async fn should_find_only_chats_containing_member() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgChatRepository::new(db::test::pool(&node).await);

        let u1 = user();
        let u2 = user();
        let team = repo.insert(NewChat::new(&u1, "Team", true, "vip")).unwrap();
        repo.update_members(&Id::from(*team.id()), &[u1.clone(), u2.clone()])
            .unwrap();
        repo.insert(NewChat::new(&u1, "Private", false, "")).unwrap();

        let actual = repo.find_by_member(&u2).unwrap();

        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].id(), team.id());
        assert!(repo.find_by_member(&user()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_find_by_id() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgChatRepository::new(db::test::pool(&node).await);

        let expected = repo.insert(NewChat::new(&user(), "Team", true, "")).unwrap();

        let actual = repo.find_by_id(&Id::from(*expected.id())).unwrap();

        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn should_not_find_by_id() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgChatRepository::new(db::test::pool(&node).await);

        let res = repo.find_by_id(&Id::from(Uuid::new_v4()));

        assert!(matches!(res, Err(super::super::Error::NotFound(_))));
    }

    #[tokio::test]
    async fn should_update_members() {
        let node = Postgres::default().start().await.unwrap();
        let repo = PgChatRepository::new(db::test::pool(&node).await);

        let u1 = user();
        let u2 = user();
        let chat = repo.insert(NewChat::new(&u1, "Team", true, "")).unwrap();

        let updated = repo
            .update_members(&Id::from(*chat.id()), &[u1.clone(), u2.clone()])
            .unwrap();

        assert_eq!(updated.members(), &[*u1.get(), *u2.get()]);
    }
}
