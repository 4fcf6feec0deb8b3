use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use crate::{message, user};

pub mod filter;
mod handler;
pub mod markup;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::ChatRepository + Send + Sync>;
pub type Service = Arc<dyn service::ChatService + Send + Sync>;

pub fn pages<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/", get(handler::pages::home))
        .route("/chats/{id}", get(handler::pages::active_chat))
        .with_state(s)
}

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/api/chats", get(handler::api::reconcile))
        .route("/api/chats", post(handler::api::create))
        .route("/api/chats/search", get(handler::api::search))
        .route("/api/chats/{id}/members", post(handler::api::add_member))
        .with_state(s)
}

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(transparent)]
pub struct Id(Uuid);

impl Id {
    pub const fn get(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Id {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("chat not found: {0}")]
    NotFound(Id),
    #[error("you are not a member of this chat")]
    NotMember,
    #[error("user is already a member of this chat")]
    AlreadyMember,
    #[error("malformed member id: {0}")]
    MalformedMember(String),
    #[error("chat name must not be empty")]
    MissingName,

    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}

/// Parses a user id typed into the add-member form.
pub fn parse_member(raw: &str) -> Result<user::Id> {
    raw.parse()
        .map_err(|_| Error::MalformedMember(raw.trim().to_string()))
}
