use std::fmt::Display;
use std::sync::Arc;

use axum::{Router, routing::post};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use crate::{chat, event, integration};

mod handler;
pub mod markup;
pub mod model;
pub mod preview;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::MessageRepository + Send + Sync>;
pub type Service = Arc<dyn service::MessageService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/api/messages", post(handler::api::send))
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

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message must have text or an attachment")]
    Empty,
    #[error("missing chat id")]
    MissingChat,
    #[error("could not upload attachment: {0}")]
    Upload(String),

    #[error(transparent)]
    _Chat(#[from] Box<chat::Error>),
    #[error(transparent)]
    _Event(#[from] event::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error(transparent)]
    _Uuid(#[from] uuid::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
