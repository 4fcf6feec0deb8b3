use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::service::AuthServiceImpl;
use crate::chat::repository::PgChatRepository;
use crate::chat::service::ChatServiceImpl;
use crate::event::service::NatsEventService;
use crate::integration::{self, Env};
use crate::message::repository::PgMessageRepository;
use crate::message::service::MessageServiceImpl;
use crate::snapshot::Snapshots;
use crate::{auth, chat, event, message};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub env: Env,

    pub auth_service: auth::Service,
    pub chat_service: chat::Service,
    pub message_service: message::Service,
    pub event_service: event::Service,
}

impl AppState {
    pub async fn init(cfg: &integration::Config) -> Self {
        let pg = cfg.pg.connect();
        let redis = cfg.redis.connect().await;
        let pubsub = cfg.pubsub.connect().await;
        let s3 = cfg.storage.connect().await;

        let snapshots = Snapshots::new(Arc::new(redis.clone()));

        let chat_repo: chat::Repository = Arc::new(PgChatRepository::new(pg.clone()));
        let message_repo: message::Repository = Arc::new(PgMessageRepository::new(pg));

        let event_service: event::Service = Arc::new(NatsEventService::new(pubsub));

        let chat_service: chat::Service = Arc::new(ChatServiceImpl::new(
            chat_repo.clone(),
            message_repo.clone(),
            snapshots.clone(),
        ));

        let message_service: message::Service = Arc::new(MessageServiceImpl::new(
            message_repo,
            chat_repo,
            Arc::new(s3),
            event_service.clone(),
            snapshots,
        ));

        let auth_service: auth::Service = Arc::new(AuthServiceImpl::new(&cfg.idp, redis));

        Self {
            env: cfg.env.clone(),
            auth_service,
            chat_service,
            message_service,
            event_service,
        }
    }
}
