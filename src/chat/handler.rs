use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotMember => Self::FORBIDDEN,
            super::Error::AlreadyMember => Self::CONFLICT,
            super::Error::MalformedMember(_) | super::Error::MissingName => Self::BAD_REQUEST,
            super::Error::_Message(e) => Self::from(e),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod pages {
    use axum::Extension;
    use axum::extract::{Path, State};
    use maud::Markup;
    use maud::Render;

    use crate::chat::markup::{ChatPane, Home};
    use crate::markup::Wrappable;
    use crate::{auth, chat};

    pub async fn home(
        auth_user: Extension<auth::User>,
        chat_service: State<chat::Service>,
    ) -> Wrappable {
        let cached = chat_service
            .cached(auth_user.id())
            .await
            .unwrap_or_default();

        Wrappable::new(Home::new(&auth_user, &cached))
    }

    pub async fn active_chat(
        auth_user: Extension<auth::User>,
        Path(id): Path<chat::Id>,
        chat_service: State<chat::Service>,
    ) -> crate::Result<Markup> {
        let chat = chat_service.find_member_chat(auth_user.id(), &id).await?;

        Ok(ChatPane::new(&chat).render())
    }
}

pub(super) mod api {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::{Extension, Form};
    use axum_extra::extract::Query;
    use log::warn;
    use maud::{Markup, Render, html};
    use serde::Deserialize;

    use crate::chat::filter::{Facets, Filter};
    use crate::chat::markup::{ChatItem, ChatList, FacetSelects, Members};
    use crate::{auth, chat};

    /// Authoritative list plus refreshed facets. A failed reconcile keeps
    /// whatever the browser is showing.
    pub async fn reconcile(
        auth_user: Extension<auth::User>,
        chat_service: State<chat::Service>,
    ) -> Response {
        match chat_service.reconcile(auth_user.id()).await {
            Ok(chats) => {
                let markup = html! {
                    (ChatList::new(&chats))
                    (FacetSelects(&Facets::derive(&chats), true))
                };
                markup.into_response()
            }
            Err(e) => {
                warn!("Could not reconcile chats of {}: {e}", auth_user.id());
                StatusCode::NO_CONTENT.into_response()
            }
        }
    }

    pub async fn search(
        auth_user: Extension<auth::User>,
        chat_service: State<chat::Service>,
        Query(filter): Query<Filter>,
    ) -> Markup {
        let chats = chat_service.search(auth_user.id(), &filter).await;
        ChatList::new(&chats).render()
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        chat_name: String,
        #[serde(default)]
        labels: String,
        #[serde(default)]
        is_group: bool,
    }

    pub async fn create(
        auth_user: Extension<auth::User>,
        chat_service: State<chat::Service>,
        Form(params): Form<CreateParams>,
    ) -> crate::Result<Markup> {
        let owner = auth_user.id();
        let chat = chat_service
            .create(owner, &params.chat_name, params.is_group, &params.labels)
            .await?;

        let loaded = chat_service.cached(owner).await.unwrap_or_default();

        Ok(html! {
            (ChatItem(&chat))
            (FacetSelects(&Facets::derive(&loaded), true))
        })
    }

    #[derive(Deserialize)]
    pub struct AddMemberParams {
        member: String,
    }

    pub async fn add_member(
        auth_user: Extension<auth::User>,
        Path(id): Path<chat::Id>,
        chat_service: State<chat::Service>,
        Form(params): Form<AddMemberParams>,
    ) -> crate::Result<Markup> {
        let member = chat::parse_member(&params.member)?;

        let chat = chat_service
            .add_member(auth_user.id(), &id, &member)
            .await?;

        Ok(Members(&chat).render())
    }
}
