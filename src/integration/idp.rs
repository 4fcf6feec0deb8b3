use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;

/// Endpoints and secrets of a GoTrue-compatible identity provider.
#[derive(Clone)]
pub struct Config {
    anon_key: String,
    jwt_secret: String,
    redirect_url: String,
    token_url: String,
    signup_url: String,
    otp_url: String,
    verify_url: String,
    logout_url: String,
    token_ttl: Duration,
}

impl Config {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        jwt_secret: impl Into<String>,
        redirect_url: impl Into<String>,
        token_ttl: Duration,
    ) -> Self {
        let url = url.into();
        let url = url.trim_end_matches('/');
        Self {
            anon_key: anon_key.into(),
            jwt_secret: jwt_secret.into(),
            redirect_url: redirect_url.into(),
            token_url: format!("{url}/token?grant_type=password"),
            signup_url: format!("{url}/signup"),
            otp_url: format!("{url}/otp"),
            verify_url: format!("{url}/verify"),
            logout_url: format!("{url}/logout"),
            token_ttl,
        }
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    pub fn signup_url(&self) -> &str {
        &self.signup_url
    }

    pub fn otp_url(&self) -> &str {
        &self.otp_url
    }

    pub fn verify_url(&self) -> &str {
        &self.verify_url
    }

    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }

    pub const fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

/// Access token issued by the provider.
#[derive(Deserialize, Debug)]
pub struct Grant {
    access_token: String,
    expires_in: Option<u64>,
}

impl Grant {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }
}

#[derive(Deserialize)]
struct SignUp {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Deserialize, Default)]
struct Rejection {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl Rejection {
    fn into_message(self, status: StatusCode) -> String {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| status.to_string())
    }
}

#[derive(Clone)]
pub struct GoTrue {
    cfg: Arc<Config>,
    http: reqwest::Client,
}

impl GoTrue {
    pub fn new(cfg: &Config, http: reqwest::Client) -> Self {
        Self {
            cfg: Arc::new(cfg.to_owned()),
            http,
        }
    }

    pub async fn password_grant(&self, email: &str, password: &str) -> super::Result<Grant> {
        debug!("Requesting password grant");
        let req = self
            .http
            .post(self.cfg.token_url())
            .json(&json!({ "email": email, "password": password }));

        self.send(req).await
    }

    /// Registers a new identity. Yields a grant only when the provider
    /// does not require email confirmation.
    pub async fn sign_up(&self, email: &str, password: &str) -> super::Result<Option<Grant>> {
        debug!("Signing up");
        let req = self
            .http
            .post(self.cfg.signup_url())
            .query(&[("redirect_to", self.cfg.redirect_url())])
            .json(&json!({ "email": email, "password": password }));

        let res: SignUp = self.send(req).await?;

        Ok(res.access_token.map(|access_token| Grant {
            access_token,
            expires_in: res.expires_in,
        }))
    }

    pub async fn send_magic_link(&self, email: &str) -> super::Result<()> {
        debug!("Requesting one-time link");
        let req = self
            .http
            .post(self.cfg.otp_url())
            .query(&[("redirect_to", self.cfg.redirect_url())])
            .json(&json!({ "email": email, "create_user": true }));

        let _: IgnoredAny = self.send(req).await?;
        Ok(())
    }

    pub async fn verify(&self, token_hash: &str, kind: &str) -> super::Result<Grant> {
        debug!("Verifying one-time link of type '{kind}'");
        let req = self
            .http
            .post(self.cfg.verify_url())
            .json(&json!({ "token_hash": token_hash, "type": kind }));

        self.send(req).await
    }

    pub async fn logout(&self, token: &str) -> super::Result<()> {
        let res = self
            .http
            .post(self.cfg.logout_url())
            .header("apikey", self.cfg.anon_key())
            .bearer_auth(token)
            .send()
            .await?;

        if res.status().is_success() {
            return Ok(());
        }

        let status = res.status();
        let rejection = res.json::<Rejection>().await.unwrap_or_default();
        Err(super::Error::Rejected(rejection.into_message(status)))
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> super::Result<T> {
        let res = req.header("apikey", self.cfg.anon_key()).send().await?;

        if res.status().is_success() {
            return Ok(res.json::<T>().await?);
        }

        let status = res.status();
        let rejection = res.json::<Rejection>().await.unwrap_or_default();
        Err(super::Error::Rejected(rejection.into_message(status)))
    }
}
