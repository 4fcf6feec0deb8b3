use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error, warn};
use minio::s3::{client::ClientBuilder, creds::StaticProvider, http::BaseUrl, types::S3Api};
use url::Url;

#[async_trait]
pub trait ObjectStore {
    async fn upload(&self, name: &str, content_type: Option<&str>, data: Bytes)
    -> super::Result<()>;

    fn public_url(&self, name: &str) -> String;
}

pub type Store = Arc<dyn ObjectStore + Send + Sync>;

#[derive(Clone)]
pub struct S3 {
    client: minio::s3::Client,
    bucket: String,
    public_url: Url,
}

#[derive(Clone)]
struct Credentials {
    user: String,
    password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: String::from("minioadmin"),
            password: String::from("minioadmin"),
        }
    }
}

impl From<Credentials> for StaticProvider {
    fn from(c: Credentials) -> Self {
        Self::new(&c.user, &c.password, None)
    }
}

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
    credentials: Credentials,
    bucket: String,
    public_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 9000,
            credentials: Credentials::default(),
            bucket: String::from("attachments"),
            public_url: String::from("http://127.0.0.1:9000"),
        }
    }
}

impl Config {
    pub fn env() -> Option<Self> {
        let host = env::var("MINIO_HOST").ok();
        let port = env::var("MINIO_PORT")
            .unwrap_or_else(|_| "9000".to_string())
            .parse()
            .ok();

        if let (Some(host), Some(port)) = (host, port) {
            let credentials = env::var("MINIO_USER")
                .and_then(|user| {
                    env::var("MINIO_PASSWORD").map(|password| Credentials { user, password })
                })
                .unwrap_or_default();
            let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "attachments".to_string());
            let public_url = env::var("MINIO_PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://{host}:{port}"));

            Some(Self {
                host,
                port,
                credentials,
                bucket,
                public_url,
            })
        } else {
            warn!("MINIO env is not configured");
            None
        }
    }

    pub async fn connect(&self) -> S3 {
        let base_url = match format!("http://{}:{}/", self.host, self.port).parse::<BaseUrl>() {
            Ok(url) => url,
            Err(e) => panic!("Failed to connect to MINIO: {e}"),
        };

        let provider = StaticProvider::from(self.credentials.clone());

        let client = match ClientBuilder::new(base_url)
            .provider(Some(Box::new(provider)))
            .build()
        {
            Ok(c) => c,
            Err(e) => panic!("Failed to connect to MINIO: {e}"),
        };

        let public_url = match Url::parse(&self.public_url) {
            Ok(url) => url,
            Err(e) => panic!("Invalid MINIO_PUBLIC_URL '{}': {e}", self.public_url),
        };

        let s3 = S3 {
            client,
            bucket: self.bucket.clone(),
            public_url,
        };

        if let Err(e) = s3.ensure_bucket().await {
            error!("Failed to ensure bucket '{}': {e}", self.bucket);
        }

        s3
    }
}

impl S3 {
    async fn ensure_bucket(&self) -> super::Result<()> {
        let exists = self.client.bucket_exists(&self.bucket).send().await?.exists;

        if !exists {
            debug!("Creating bucket '{}'", self.bucket);
            self.client.create_bucket(&self.bucket).send().await?;
        }

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3 {
    async fn upload(
        &self,
        name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> super::Result<()> {
        debug!("Uploading '{name}' ({} bytes)", data.len());

        let mut req = self.client.put_object_content(&self.bucket, name, data);
        if let Some(ct) = content_type {
            req = req.content_type(ct.to_string());
        }

        req.send()
            .await
            .map(|_| ())
            .map_err(|e| super::Error::Storage(e.to_string()))
    }

    fn public_url(&self, name: &str) -> String {
        object_url(&self.public_url, &self.bucket, name)
    }
}

fn object_url(base: &Url, bucket: &str, name: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(bucket).push(name);
    }
    url.to_string()
}
