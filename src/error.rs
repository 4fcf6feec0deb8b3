use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::{auth, chat, event, integration, message};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _Chat(#[from] chat::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Event(#[from] event::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let status = match self {
            Self::_Auth(e) => StatusCode::from(e),
            Self::_Chat(e) => StatusCode::from(e),
            Self::_Message(e) => StatusCode::from(e),
            Self::_Event(_) | Self::_Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("{message}");
            return (status, "Internal server error").into_response();
        }

        warn!("{message}");
        (status, message).into_response()
    }
}
