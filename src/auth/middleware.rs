use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use log::debug;

use crate::auth::{self, Session};

/// Binds the identity of a live session to the request. A session whose
/// token is gone or no longer valid is cleared and the request continues
/// unauthenticated, so `authorize` can send it to `/login`.
pub async fn validate_sid(
    auth_service: State<auth::Service>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(sid) = jar.get(Session::ID).map(Session::from) else {
        return next.run(req).await;
    };
    debug!("Active {sid:?} found");

    let user = match auth_service.find_token(&sid).await {
        Some(token) => match auth_service.validate(&token).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Token of {sid:?} is no longer valid: {e}");
                None
            }
        },
        None => {
            debug!("No associated token found for {sid:?}");
            None
        }
    };

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            let jar = jar.remove(Session::removal());
            (jar, next.run(req).await).into_response()
        }
    }
}

pub async fn authorize(req: Request, next: Next) -> Response {
    if req.extensions().get::<auth::User>().is_none() {
        return redirect(req.headers(), "/login");
    }

    next.run(req).await
}

/// htmx swaps the body of a redirected XHR instead of navigating, so it
/// gets an `HX-Redirect` header.
fn redirect(headers: &HeaderMap, to: &'static str) -> Response {
    if headers.contains_key("HX-Request") {
        return (StatusCode::OK, [("HX-Redirect", to)]).into_response();
    }

    Redirect::to(to).into_response()
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request, header},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
    };
    use chat_front::Raw;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::service::{AuthService, Grant};
    use crate::user;

    const SID: &str = "6e5bd7b4-0a0f-4c68-a1f1-5f1b3c1c9a11";

    struct FakeAuth;

    #[async_trait]
    impl AuthService for FakeAuth {
        async fn sign_in(&self, _: &str, _: &str) -> auth::Result<Grant> {
            Err(auth::Error::Unauthorized)
        }

        async fn sign_up(&self, _: &str, _: &str) -> auth::Result<Option<Grant>> {
            Ok(None)
        }

        async fn send_magic_link(&self, _: &str) -> auth::Result<()> {
            Ok(())
        }

        async fn verify(&self, _: &str, _: &str) -> auth::Result<Grant> {
            Err(auth::Error::Unauthorized)
        }

        async fn validate(&self, token: &str) -> auth::Result<auth::User> {
            match token {
                "valid" => Ok(auth::User::new(
                    user::Id::from(Uuid::nil()),
                    user::Email::new("jora@example.com"),
                )),
                _ => Err(auth::Error::Forbidden),
            }
        }

        async fn cache_token(&self, _: &Session, _: &Grant) -> auth::Result<()> {
            Ok(())
        }

        async fn invalidate_token(&self, _: &Session) -> auth::Result<()> {
            Ok(())
        }

        async fn find_token(&self, sid: &Session) -> Option<String> {
            match sid.raw() {
                SID => Some("valid".into()),
                "expired" => Some("expired".into()),
                _ => None,
            }
        }
    }

    fn app() -> Router {
        let auth_service: auth::Service = Arc::new(FakeAuth);

        let protected = Router::new()
            .route(
                "/",
                get(|user: Extension<auth::User>| async move { user.email().to_string() }),
            )
            .route_layer(from_fn(authorize));

        Router::new()
            .merge(protected)
            .route("/login", get(|| async { "login" }))
            .route("/logout", get(auth::handler::api::logout))
            .layer(from_fn_with_state(auth_service.clone(), validate_sid))
            .with_state(auth_service)
    }

    fn location(res: &Response) -> &str {
        res.headers()
            .get(header::LOCATION)
            .and_then(|l| l.to_str().ok())
            .unwrap_or_default()
    }

    fn clears_session(res: &Response) -> bool {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|c| c.to_str().ok())
            .any(|c| c.starts_with("session_id=;") && c.contains("Max-Age=0"))
    }

    fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
        Request::get(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn should_redirect_to_login_without_session() {
        let req = Request::get("/").body(Body::empty()).unwrap();

        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn should_ask_htmx_to_redirect_to_login_without_session() {
        let req = Request::get("/")
            .header("HX-Request", "true")
            .body(Body::empty())
            .unwrap();

        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("HX-Redirect").unwrap(), "/login");
    }

    #[tokio::test]
    async fn should_clear_unknown_session_and_redirect_to_login() {
        let res = app()
            .oneshot(get_with_cookie("/", "session_id=unknown"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/login");
        assert!(clears_session(&res));
    }

    #[tokio::test]
    async fn should_clear_expired_session_and_redirect_to_login() {
        let res = app()
            .oneshot(get_with_cookie("/", "session_id=expired"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/login");
        assert!(clears_session(&res));
    }

    #[tokio::test]
    async fn should_logout_stale_session_without_redirect_loop() {
        let res = app()
            .oneshot(get_with_cookie("/logout", "session_id=unknown"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/login");
        assert!(clears_session(&res));
    }

    #[tokio::test]
    async fn should_serve_login_to_stale_session() {
        let res = app()
            .oneshot(get_with_cookie("/login", "session_id=expired"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(clears_session(&res));
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"login");
    }

    #[tokio::test]
    async fn should_bind_identity_for_valid_session() {
        let req = Request::get("/")
            .header(header::COOKIE, format!("session_id={SID}"))
            .body(Body::empty())
            .unwrap();

        let res = app().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"jora@example.com");
    }
}
