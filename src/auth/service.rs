use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use email_address::EmailAddress;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::{debug, error, warn};
use uuid::Uuid;

use super::{Session, TokenClaims, User};
use crate::integration::{self, cache, idp};
use chat_front::Raw;

/// Access token together with its lifetime.
pub struct Grant {
    pub token: String,
    pub ttl: Duration,
}

#[async_trait]
pub trait AuthService {
    async fn sign_in(&self, email: &str, password: &str) -> super::Result<Grant>;

    /// `None` means the provider sent a confirmation email instead of
    /// opening a session.
    async fn sign_up(&self, email: &str, password: &str) -> super::Result<Option<Grant>>;

    async fn send_magic_link(&self, email: &str) -> super::Result<()>;

    async fn verify(&self, token_hash: &str, kind: &str) -> super::Result<Grant>;

    async fn validate(&self, token: &str) -> super::Result<User>;

    async fn cache_token(&self, sid: &Session, grant: &Grant) -> super::Result<()>;

    async fn invalidate_token(&self, sid: &Session) -> super::Result<()>;

    async fn find_token(&self, sid: &Session) -> Option<String>;
}

/// HS256 validation of access tokens signed with the provider's shared
/// secret.
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[super::AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> super::Result<User> {
        decode::<TokenClaims>(token, &self.key, &self.validation)
            .map(|data| User::from(data.claims))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                    warn!("Failed to decode token: {e:?}");
                    super::Error::TokenMalformed
                }
                _ => {
                    debug!("Token rejected: {e:?}");
                    super::Error::Forbidden
                }
            })
    }
}

#[derive(Clone)]
pub struct AuthServiceImpl {
    cfg: Arc<idp::Config>,
    provider: idp::GoTrue,
    redis: cache::Redis,
    validator: Arc<TokenValidator>,
}

impl AuthServiceImpl {
    pub fn new(cfg: &idp::Config, redis: cache::Redis) -> Self {
        Self {
            cfg: Arc::new(cfg.to_owned()),
            provider: idp::GoTrue::new(cfg, integration::init_http_client()),
            redis,
            validator: Arc::new(TokenValidator::new(cfg.jwt_secret())),
        }
    }

    fn grant(&self, g: idp::Grant) -> Grant {
        Grant {
            ttl: g.expires_in().unwrap_or(self.cfg.token_ttl()),
            token: g.access_token().to_string(),
        }
    }
}

fn check_email(email: &str) -> super::Result<&str> {
    let email = email.trim();
    EmailAddress::from_str(email)
        .map(|_| email)
        .map_err(|_| super::Error::InvalidEmail(email.to_string()))
}

fn check_password(password: &str) -> super::Result<&str> {
    if password.is_empty() {
        return Err(super::Error::MissingPassword);
    }
    Ok(password)
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn sign_in(&self, email: &str, password: &str) -> super::Result<Grant> {
        let email = check_email(email)?;
        let password = check_password(password)?;

        let grant = self.provider.password_grant(email, password).await?;
        Ok(self.grant(grant))
    }

    async fn sign_up(&self, email: &str, password: &str) -> super::Result<Option<Grant>> {
        let email = check_email(email)?;
        let password = check_password(password)?;

        let grant = self.provider.sign_up(email, password).await?;
        Ok(grant.map(|g| self.grant(g)))
    }

    async fn send_magic_link(&self, email: &str) -> super::Result<()> {
        let email = check_email(email)?;
        self.provider.send_magic_link(email).await?;
        Ok(())
    }

    async fn verify(&self, token_hash: &str, kind: &str) -> super::Result<Grant> {
        let grant = self.provider.verify(token_hash, kind).await?;
        Ok(self.grant(grant))
    }

    async fn validate(&self, token: &str) -> super::Result<User> {
        self.validator.validate(token)
    }

    async fn cache_token(&self, sid: &Session, grant: &Grant) -> super::Result<()> {
        debug!("Caching token for {sid:?}");

        let sid = Uuid::parse_str(sid.raw())?;
        self.redis
            .set_ex_explicit(cache::Key::Session(&sid), &grant.token, &grant.ttl)
            .await?;
        Ok(())
    }

    async fn invalidate_token(&self, sid: &Session) -> super::Result<()> {
        debug!("Invalidating token for {sid:?}");

        let sid = Uuid::parse_str(sid.raw())?;
        let token = self.redis.get_del(cache::Key::Session(&sid)).await;

        if let Some(token) = token {
            if let Err(e) = self.provider.logout(&token).await {
                warn!("Provider did not end the session: {e}");
            }
        }

        Ok(())
    }

    async fn find_token(&self, sid: &Session) -> Option<String> {
        if let Ok(id) = Uuid::parse_str(sid.raw()) {
            self.redis.get(cache::Key::Session(&id)).await
        } else {
            error!("Could not find token for {sid:?}");
            None
        }
    }
}
