use std::env;
use std::str::FromStr;
use std::time::Duration;
use std::{fs::File, net::SocketAddr};

use axum::http::HeaderValue;
use axum_server::tls_openssl::OpenSSLConfig;
use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin};

pub mod cache;
pub mod db;
pub mod idp;
pub mod pubsub;
pub mod storage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub enum Env {
    Local,
    Dev,
    Stage,
    Production,
}

impl Env {
    pub fn addr(&self) -> SocketAddr {
        match self {
            Env::Local => SocketAddr::from(([127, 0, 0, 1], 8000)),
            Env::Dev | Env::Stage => SocketAddr::from(([0, 0, 0, 0], 8000)),
            Env::Production => SocketAddr::from(([0, 0, 0, 0], 8443)),
        }
    }

    pub fn ssl_config(&self) -> Option<OpenSSLConfig> {
        match self {
            Env::Local | Env::Dev | Env::Stage => None,
            Env::Production => {
                let ssl_config = OpenSSLConfig::from_pem_file(
                    env::var("SSL_CERT_FILE").expect("SSL_CERT_FILE must be set"),
                    env::var("SSL_KEY_FILE").expect("SSL_KEY_FILE must be set"),
                )
                .expect("cert should be present and have read permission");
                Some(ssl_config)
            }
        }
    }

    pub fn allow_origin(&self) -> AllowOrigin {
        match self {
            Env::Local | Env::Dev => AllowOrigin::any(),
            Env::Stage | Env::Production => {
                let origins = env::var("ALLOW_ORIGIN")
                    .expect("ALLOW_ORIGIN must be set")
                    .split(',')
                    .map(HeaderValue::from_str)
                    .map(|r| r.expect("invalid ALLOW_ORIGIN value"))
                    .collect::<Vec<HeaderValue>>();
                AllowOrigin::list(origins)
            }
        }
    }

    pub fn allow_methods(&self) -> AllowMethods {
        AllowMethods::any()
    }

    pub fn allow_headers(&self) -> AllowHeaders {
        AllowHeaders::any()
    }

    /// Session cookies are only marked secure when served over TLS.
    pub const fn secure_cookies(&self) -> bool {
        matches!(self, Env::Production)
    }
}

impl FromStr for Env {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "stg" => Ok(Env::Stage),
            "prod" => Ok(Env::Production),
            other => Err(Error::InvalidEnv(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub env: Env,

    pub pg: db::Config,
    pub redis: cache::Config,
    pub pubsub: pubsub::Config,
    pub storage: storage::Config,

    pub idp: idp::Config,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        init_logger();

        let env = env::var("ENV")
            .map(|env| match env.parse::<Env>() {
                Ok(env) => env,
                Err(e) => panic!("{e}"),
            })
            .unwrap_or(Env::Local);

        let idp_cfg = idp::Config::new(
            env::var("AUTH_URL").expect("AUTH_URL must be set"),
            env::var("AUTH_ANON_KEY").expect("AUTH_ANON_KEY must be set"),
            env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set"),
            env::var("AUTH_REDIRECT_URL").expect("AUTH_REDIRECT_URL must be set"),
            Duration::from_secs(
                env::var("TOKEN_TTL")
                    .unwrap_or("3600".into())
                    .parse()
                    .expect("Failed to parse TOKEN_TTL"),
            ),
        );

        Self {
            env,
            pg: db::Config::env().unwrap_or_default(),
            redis: cache::Config::env().unwrap_or_default(),
            pubsub: pubsub::Config::env().unwrap_or_default(),
            storage: storage::Config::env().unwrap_or_default(),
            idp: idp_cfg,
        }
    }
}

fn init_logger() {
    let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
    let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
    let log_file = env::var("SERVICE_NAME")
        .map(|pkg| format!("{pkg}.log"))
        .unwrap_or("service.log".into());

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            level,
            simplelog::Config::default(),
            File::create(log_file).expect("Failed to create log file"),
        ),
    ])
    .expect("Failed to initialize logger");
}

pub fn init_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            panic!("Failed to initialize HTTP client: {e}")
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid environment: {0}")]
    InvalidEnv(String),
    #[error("object storage failure: {0}")]
    Storage(String),
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    _Env(#[from] env::VarError),
    #[error(transparent)]
    _ParseInt(#[from] std::num::ParseIntError),
    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    _Redis(#[from] redis::RedisError),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _NatsConnect(#[from] async_nats::ConnectError),
    #[error(transparent)]
    _Minio(#[from] minio::s3::error::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_parse_known_envs() {
        assert!(matches!("local".parse::<Env>(), Ok(Env::Local)));
        assert!(matches!("dev".parse::<Env>(), Ok(Env::Dev)));
        assert!(matches!("stg".parse::<Env>(), Ok(Env::Stage)));
        assert!(matches!("prod".parse::<Env>(), Ok(Env::Production)));
    }

    #[test]
    fn should_reject_unknown_env() {
        let err = "qa".parse::<Env>().err();
        assert!(matches!(err, Some(Error::InvalidEnv(e)) if e == "qa"));
    }

    #[test]
    fn should_bind_production_on_tls_port() {
        assert_eq!(Env::Production.addr().port(), 8443);
        assert_eq!(
            Env::Local.addr(),
            SocketAddr::from(([127, 0, 0, 1], 8000))
        );
    }

    #[test]
    fn should_only_secure_cookies_in_production() {
        assert!(Env::Production.secure_cookies());
        assert!(!Env::Local.secure_cookies());
        assert!(!Env::Stage.secure_cookies());
    }
}
