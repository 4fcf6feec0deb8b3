use std::env;
use std::time::Duration;

use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    user: String,
    password: String,
    db: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 5432,
            user: String::from("postgres"),
            password: String::from("postgres"),
            db: String::from("postgres"),
        }
    }
}

impl Config {
    pub fn env() -> super::Result<Self> {
        let host = env::var("PG_HOST")?;
        let port = env::var("PG_PORT")?.parse()?;
        let user = env::var("PG_USER")?;
        let password = env::var("PG_PASSWORD")?;
        let db = env::var("PG_DB")?;
        Ok(Self {
            host,
            port,
            user,
            password,
            db,
        })
    }

    fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.db
        )
    }

    pub fn connect(&self) -> Pool {
        let manager = ConnectionManager::<PgConnection>::new(self.url());

        match r2d2::Pool::builder()
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
        {
            Ok(pool) => pool,
            Err(e) => panic!("Failed to connect to Postgres: {e}"),
        }
    }
}

#[cfg(test)]
pub mod test {
    use diesel::connection::SimpleConnection;
    use testcontainers_modules::postgres::Postgres;
    use testcontainers_modules::testcontainers::ContainerAsync;

    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/2025-06-01-000000_chats_messages/up.sql");

    impl Config {
        pub async fn test(node: &ContainerAsync<Postgres>) -> Self {
            let host = node.get_host().await.unwrap().to_string();
            let port = node.get_host_port_ipv4(5432).await.unwrap();

            Self {
                host,
                port,
                ..Self::default()
            }
        }
    }

    /// Opens a pool against the container and applies the schema.
    pub async fn pool(node: &ContainerAsync<Postgres>) -> Pool {
        let pool = Config::test(node).await.connect();
        let mut conn = pool.get().unwrap();
        conn.batch_execute(SCHEMA).unwrap();
        pool
    }
}
