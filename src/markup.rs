use std::convert::Infallible;

use axum::{
    body::Body,
    http::header::CONTENT_LENGTH,
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use chrono::{DateTime, SecondsFormat};
use maud::{DOCTYPE, Markup, Render, html};

const TITLE: &str = "Chat";

struct Head<'a>(&'a str);

impl Render for Head<'_> {
    fn render(&self) -> Markup {
        html! {
            head {
                meta charset="utf-8" {}
                meta name="viewport" content="width=device-width, initial-scale=1" {}
                title { (self.0) }
                script src="https://unpkg.com/htmx.org@2.0.4" {}
                script src="https://unpkg.com/htmx-ext-sse@2.2.3/sse.js" {}
                script src="https://unpkg.com/hyperscript.org@0.9.13" {}

                script src="https://unpkg.com/@tailwindcss/browser@4" {}
                script src="/static/scripts.js" {}

                link rel="stylesheet" href="/static/styles.css" {}
                link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.6.0/css/all.min.css" {}
            }
        }
    }
}

struct Screen<'a>(&'a Markup);

impl Render for Screen<'_> {
    fn render(&self) -> Markup {
        html! {
            #screen
                ."max-w-6xl h-5/6 w-full"
                ."bg-white rounded-2xl"
                ."overflow-hidden"
            {
                (self.0)
            }
        }
    }
}

fn base(w: &Wrappable) -> Markup {
    html! {
        (DOCTYPE)
        html {
            (Head(TITLE))

            body ."h-screen bg-[#eae6df] flex items-center justify-center" {
                (Screen(&w.content))
            }
        }
    }
}

/// Full-page content. Responses carrying it are wrapped into the base
/// document by [`wrap_in_base`], htmx fragments are sent as they are.
#[derive(Clone)]
pub struct Wrappable {
    content: Markup,
}

impl Wrappable {
    pub fn new(content: impl Render) -> Self {
        Self {
            content: content.render(),
        }
    }
}

impl IntoResponseParts for Wrappable {
    type Error = Infallible;

    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> core::result::Result<ResponseParts, Self::Error> {
        res.extensions_mut().insert(self);
        Ok(res)
    }
}

impl IntoResponse for Wrappable {
    fn into_response(self) -> Response {
        (self, ()).into_response()
    }
}

pub async fn wrap_in_base(mut resp: Response) -> Response {
    if let Some(w) = resp.extensions_mut().remove::<Wrappable>() {
        resp.headers_mut().remove(CONTENT_LENGTH);
        *resp.body_mut() = Body::new(base(&w).into_string());
    }

    resp
}

/// Timestamp rendered as `HH:MM` in UTC; `/static/scripts.js` rewrites it
/// to the browser's local time.
pub struct LocalTime(pub i64);

impl Render for LocalTime {
    fn render(&self) -> Markup {
        let Some(dt) = DateTime::from_timestamp_millis(self.0) else {
            return html! {};
        };

        html! {
            time datetime=(dt.to_rfc3339_opts(SecondsFormat::Millis, true)) {
                (dt.format("%H:%M"))
            }
        }
    }
}
