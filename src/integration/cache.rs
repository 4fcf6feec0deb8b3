use std::env;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{chat, snapshot, user};

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
        }
    }
}

impl Config {
    pub fn env() -> super::Result<Self> {
        let host = env::var("REDIS_HOST")?;
        let port = env::var("REDIS_PORT")?.parse()?;
        Ok(Self { host, port })
    }

    pub async fn connect(&self) -> Redis {
        let con = match redis::Client::open(format!("redis://{}:{}", self.host, self.port)) {
            Ok(client) => client.get_connection_manager().await,
            Err(e) => panic!("Failed to create Redis client: {e}"),
        };

        match con {
            Ok(con) => Redis { con },
            Err(e) => panic!("Failed to connect to Redis: {e}"),
        }
    }
}

#[derive(Clone)]
pub enum Key<'a> {
    Session(&'a Uuid),
    Chats(&'a user::Id),
    Messages(&'a chat::Id),
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Session(sid) => write!(f, "session:{sid}"),
            Key::Chats(user_id) => write!(f, "chats:{user_id}"),
            Key::Messages(chat_id) => write!(f, "messages:{chat_id}"),
        }
    }
}

/// Thin wrapper over a Redis connection manager.
///
/// Failures are logged and reported as cache misses.
#[derive(Clone)]
pub struct Redis {
    con: redis::aio::ConnectionManager,
}

impl Redis {
    pub async fn get(&self, key: Key<'_>) -> Option<String> {
        let mut con = self.con.clone();
        match con.get::<_, Option<String>>(key.to_string()).await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to get value for key '{key}': {e:?}");
                None
            }
        }
    }

    pub async fn set(&self, key: Key<'_>, value: &str) {
        let mut con = self.con.clone();
        if let Err(e) = con.set::<_, _, ()>(key.to_string(), value).await {
            error!("Failed to set value for key '{key}': {e:?}");
        }
    }

    /// Unlike the other writes, a failure here is reported to the caller.
    pub async fn set_ex_explicit(
        &self,
        key: Key<'_>,
        value: &str,
        ttl: &Duration,
    ) -> super::Result<()> {
        let mut con = self.con.clone();
        con.set_ex::<_, _, ()>(key.to_string(), value, ttl.as_secs())
            .await
            .map_err(|e| {
                error!("Failed to set value with expiry for key '{key}': {e:?}");
                super::Error::from(e)
            })
    }

    pub async fn get_del(&self, key: Key<'_>) -> Option<String> {
        let mut con = self.con.clone();
        match con.get_del::<_, Option<String>>(key.to_string()).await {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to get and delete key '{key}': {e:?}");
                None
            }
        }
    }
}

#[async_trait]
impl snapshot::SnapshotStore for Redis {
    async fn load(&self, key: &Key<'_>) -> Option<String> {
        debug!("Loading snapshot '{key}'");
        self.get(key.clone()).await
    }

    async fn store(&self, key: &Key<'_>, value: String) {
        debug!("Storing snapshot '{key}'");
        self.set(key.clone(), &value).await
    }
}
