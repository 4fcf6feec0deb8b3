use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::Unauthorized => Self::UNAUTHORIZED,
            super::Error::Forbidden => Self::FORBIDDEN,
            super::Error::TokenMalformed
            | super::Error::InvalidEmail(_)
            | super::Error::MissingPassword
            | super::Error::_Uuid(_) => Self::BAD_REQUEST,
            super::Error::_Integration(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod pages {
    use crate::{auth::markup, markup::Wrappable};

    pub async fn login() -> Wrappable {
        Wrappable::new(markup::Login::default())
    }
}

pub(super) mod api {
    use axum::{
        extract::State,
        response::{IntoResponse, Redirect, Response},
    };
    use axum::Form;
    use axum_extra::extract::cookie::{self, Cookie};
    use axum_extra::extract::{CookieJar, Query};
    use log::{debug, warn};
    use maud::Render;
    use serde::Deserialize;

    use crate::auth::markup::{Login, Notice};
    use crate::auth::service::Grant;
    use crate::auth::{self, Session};
    use crate::integration::{self, Env};
    use crate::markup::Wrappable;

    const CHECK_EMAIL: &str = "Check your email to continue signing in.";
    const SESSION_UNAVAILABLE: &str = "Could not start a session, please try again.";

    #[derive(Deserialize)]
    pub struct Credentials {
        email: String,
        #[serde(default)]
        password: String,
    }

    pub async fn sign_in(
        auth_service: State<auth::Service>,
        env: State<Env>,
        jar: CookieJar,
        Form(params): Form<Credentials>,
    ) -> Response {
        match auth_service.sign_in(&params.email, &params.password).await {
            Ok(grant) => open_session(&auth_service, &env, jar, grant).await,
            Err(e) => inline_error(e),
        }
    }

    pub async fn sign_up(
        auth_service: State<auth::Service>,
        env: State<Env>,
        jar: CookieJar,
        Form(params): Form<Credentials>,
    ) -> Response {
        match auth_service.sign_up(&params.email, &params.password).await {
            Ok(Some(grant)) => open_session(&auth_service, &env, jar, grant).await,
            Ok(None) => Notice::Info(CHECK_EMAIL.into()).render().into_response(),
            Err(e) => inline_error(e),
        }
    }

    #[derive(Deserialize)]
    pub struct MagicLinkParams {
        email: String,
    }

    pub async fn magic_link(
        auth_service: State<auth::Service>,
        Form(params): Form<MagicLinkParams>,
    ) -> Response {
        match auth_service.send_magic_link(&params.email).await {
            Ok(()) => Notice::Info(CHECK_EMAIL.into()).render().into_response(),
            Err(e) => inline_error(e),
        }
    }

    #[derive(Deserialize)]
    pub struct ConfirmParams {
        token_hash: String,
        #[serde(rename = "type", default = "default_kind")]
        kind: String,
    }

    fn default_kind() -> String {
        String::from("magiclink")
    }

    pub async fn confirm(
        Query(params): Query<ConfirmParams>,
        auth_service: State<auth::Service>,
        env: State<Env>,
        jar: CookieJar,
    ) -> Response {
        let grant = match auth_service.verify(&params.token_hash, &params.kind).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!("Could not verify one-time link: {e}");
                let login = Login::with_notice(Notice::Error(e.to_string()));
                return Wrappable::new(login).into_response();
            }
        };

        let sid = Session::random();
        if let Err(e) = auth_service.cache_token(&sid, &grant).await {
            let login = Login::with_notice(Notice::Error(e.to_string()));
            return Wrappable::new(login).into_response();
        }

        (jar.add(session_cookie(sid, &env)), Redirect::to("/")).into_response()
    }

    pub async fn logout(auth_service: State<auth::Service>, jar: CookieJar) -> impl IntoResponse {
        if let Some(sid) = jar.get(auth::Session::ID) {
            let sid = Session::from(sid);
            debug!("Terminating session {sid:?}");
            if let Err(e) = auth_service.invalidate_token(&sid).await {
                warn!("Could not invalidate token of {sid:?}: {e}");
            }
            return (jar.remove(Session::removal()), Redirect::to("/login"));
        }

        debug!("No sid found, redirecting to login");
        (jar, Redirect::to("/login"))
    }

    async fn open_session(
        auth_service: &auth::Service,
        env: &Env,
        jar: CookieJar,
        grant: Grant,
    ) -> Response {
        let sid = Session::random();
        debug!("Initializing session {sid:?}");

        if let Err(e) = auth_service.cache_token(&sid, &grant).await {
            return inline_error(e);
        }

        (jar.add(session_cookie(sid, env)), [("HX-Redirect", "/")]).into_response()
    }

    fn session_cookie(sid: Session, env: &Env) -> Cookie<'static> {
        let mut sid = Cookie::from(sid);
        sid.set_path("/");
        sid.set_secure(env.secure_cookies());
        sid.set_http_only(true);
        sid.set_same_site(cookie::SameSite::Lax);
        sid
    }

    fn inline_error(e: auth::Error) -> Response {
        warn!("Authentication failed: {e}");
        let msg = match e {
            auth::Error::_Integration(integration::Error::_Redis(_)) => {
                String::from(SESSION_UNAVAILABLE)
            }
            e => e.to_string(),
        };
        Notice::Error(msg).render().into_response()
    }

}
