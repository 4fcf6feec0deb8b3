use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state, map_response};
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{authorize, validate_sid};
use crate::state::AppState;

mod auth;
mod chat;
mod error;
mod event;
mod integration;
mod markup;
mod message;
mod schema;
mod snapshot;
mod state;
mod thread;
mod user;

pub(crate) use error::{Error, Result};

/// Attachments are sent inline with the message form.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[tokio::main]
async fn main() {
    let cfg = integration::Config::default();
    let state = AppState::init(&cfg).await;

    let app = app(state);

    let addr = cfg.env.addr();
    info!("Listening on {addr}");

    let served = match cfg.env.ssl_config() {
        Some(tls) => {
            axum_server::bind_openssl(addr, tls)
                .serve(app.into_make_service())
                .await
        }
        None => axum_server::bind(addr).serve(app.into_make_service()).await,
    };

    if let Err(e) = served {
        panic!("Server stopped unexpectedly: {e}");
    }
}

fn app(s: AppState) -> Router {
    let env = &s.env;
    let cors = CorsLayer::new()
        .allow_origin(env.allow_origin())
        .allow_methods(env.allow_methods())
        .allow_headers(env.allow_headers());

    let protected = Router::new()
        .merge(chat::pages(s.clone()))
        .merge(chat::api(s.clone()))
        .merge(message::api(s.clone()).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
        .merge(thread::sse(s.clone()))
        .route_layer(from_fn(authorize));

    Router::new()
        .merge(protected)
        .merge(auth::pages(s.clone()))
        .merge(auth::api(s.clone()))
        .layer(from_fn_with_state(s.auth_service.clone(), validate_sid))
        .layer(map_response(markup::wrap_in_base))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .nest_service("/static", ServeDir::new("static"))
}
