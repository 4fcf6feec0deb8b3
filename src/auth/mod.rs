use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use axum_extra::extract::cookie::Cookie;
use chat_front::{Raw, Redact};
use serde::Deserialize;
use uuid::Uuid;

use crate::state::AppState;
use crate::{integration, user};

pub mod handler;
pub mod markup;
pub mod middleware;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

const AUDIENCE: &str = "authenticated";

#[derive(Deserialize, Clone)]
struct TokenClaims {
    sub: Uuid,
    #[serde(default)]
    email: String,
}

pub fn pages<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/login", get(handler::pages::login))
        .with_state(s)
}

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/api/auth/sign-in", post(handler::api::sign_in))
        .route("/api/auth/sign-up", post(handler::api::sign_up))
        .route("/api/auth/magic-link", post(handler::api::magic_link))
        .route("/auth/confirm", get(handler::api::confirm))
        .route("/logout", get(handler::api::logout))
        .with_state(s)
}

/// Identity bound to the current request.
#[derive(Clone, Debug)]
pub struct User {
    id: user::Id,
    email: user::Email,
}

impl User {
    pub fn new(id: user::Id, email: user::Email) -> Self {
        Self { id, email }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }

    pub const fn email(&self) -> &user::Email {
        &self.email
    }
}

impl From<TokenClaims> for User {
    fn from(c: TokenClaims) -> Self {
        Self::new(user::Id::from(c.sub), user::Email::new(c.email))
    }
}

#[derive(Deserialize, PartialEq)]
pub struct Session(String);

impl Session {
    const ID: &str = "session_id";

    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    pub fn random() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Cookie that clears the session from the browser.
    pub fn removal() -> Cookie<'static> {
        let mut c = Cookie::from(Self::ID);
        c.set_path("/");
        c
    }
}

impl Redact for Session {}

impl Raw for Session {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.redact())
    }
}

impl From<&Cookie<'_>> for Session {
    fn from(c: &Cookie<'_>) -> Self {
        Self::new(c.value())
    }
}

impl From<Session> for Cookie<'_> {
    fn from(s: Session) -> Self {
        Self::new(Session::ID, s.raw().to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("forbidden to access the resource")]
    Forbidden,
    #[error("token is malformed")]
    TokenMalformed,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password is required")]
    MissingPassword,

    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Uuid(#[from] uuid::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_redact_session_in_debug() {
        let sid = Session::new("6e5bd7b4-0a0f-4c68-a1f1-5f1b3c1c9a11");
        assert_eq!(format!("{sid:?}"), "Session(6e5b****)");
    }

    #[test]
    fn should_convert_session_into_cookie() {
        let cookie = Cookie::from(Session::new("abc"));
        assert_eq!(cookie.name(), "session_id");
        assert_eq!(cookie.value(), "abc");
    }
}
