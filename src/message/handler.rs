use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::Empty | super::Error::MissingChat => Self::BAD_REQUEST,
            super::Error::_Multipart(_) | super::Error::_Uuid(_) => Self::BAD_REQUEST,
            super::Error::Upload(_) => Self::BAD_GATEWAY,
            super::Error::_Chat(e) => Self::from(*e),
            super::Error::_Event(_)
            | super::Error::_Integration(_)
            | super::Error::_R2d2(_)
            | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::extract::{Multipart, State};
    use axum::http::HeaderValue;
    use axum::response::{IntoResponse, Response};
    use axum::Extension;
    use log::warn;
    use maud::Render;
    use serde_json::json;

    use crate::message::markup::Composer;
    use crate::message::model::{Attachment, Draft};
    use crate::{auth, chat, message};

    pub async fn send(
        auth_user: Extension<auth::User>,
        message_service: State<message::Service>,
        multipart: Multipart,
    ) -> crate::Result<Response> {
        let draft = read_draft(multipart).await?;
        let chat_id = draft.chat_id().clone();

        let sent = message_service.send(&auth_user, draft).await?;

        let mut res = Composer(&chat_id).render().into_response();
        if let Some(e) = sent.upload_error {
            warn!("Attachment dropped from message {}: {e}", sent.message.id());
            res.headers_mut()
                .insert("HX-Trigger", show_alert(&format!("Attachment not sent: {e}")));
        }

        Ok(res)
    }

    async fn read_draft(mut multipart: Multipart) -> message::Result<Draft> {
        let mut chat_id = None;
        let mut text = String::new();
        let mut file = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "chat_id" => chat_id = Some(field.text().await?.parse::<chat::Id>()?),
                "text" => text = field.text().await?,
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(String::from);
                    let data = field.bytes().await?;
                    file = Some(Attachment::new(file_name, content_type, data));
                }
                _ => {}
            }
        }

        let chat_id = chat_id.ok_or(message::Error::MissingChat)?;
        Ok(Draft::new(chat_id, text, file))
    }

    fn show_alert(message: &str) -> HeaderValue {
        let trigger = ascii_json(&json!({ "showAlert": { "message": message } }).to_string());
        HeaderValue::from_str(&trigger)
            .unwrap_or_else(|_| HeaderValue::from_static(r#"{"showAlert":{"message":"Attachment not sent"}}"#))
    }

    /// Header values are read as latin-1, so everything outside ASCII is
    /// sent as JSON `\uXXXX` escapes.
    fn ascii_json(json: &str) -> String {
        let mut out = String::with_capacity(json.len());
        for c in json.chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
        out
    }

}
