pub(super) mod stream {
    use std::convert::Infallible;

    use axum::Extension;
    use axum::extract::{Path, State};
    use axum::response::sse::{self, KeepAlive, Sse};
    use futures::{Stream, StreamExt};
    use log::{debug, error};
    use maud::Render;

    use crate::event::{Event, Subject};
    use crate::message::markup::{MessageItem, MessageList};
    use crate::message::model::MessageDto;
    use crate::thread::Thread;
    use crate::{auth, chat, event, message, user};

    enum Step {
        Fetched(message::Result<Vec<MessageDto>>),
        Feed(Option<Event>),
    }

    pub async fn open(
        auth_user: Extension<auth::User>,
        Path(chat_id): Path<chat::Id>,
        chat_service: State<chat::Service>,
        State(message_service): State<message::Service>,
        event_service: State<event::Service>,
    ) -> crate::Result<Sse<impl Stream<Item = Result<sse::Event, Infallible>>>> {
        let chat = chat_service
            .find_member_chat(auth_user.id(), &chat_id)
            .await?;

        // subscribe first so inserts racing the history fetch are not lost
        let mut feed = event_service.subscribe(&Subject::MessageInserts).await?;

        let viewer = auth_user.id().clone();
        let group = chat.is_group();

        let stream = async_stream::stream! {
            let mut thread = Thread::default();

            let cached = message_service.cached(&chat_id).await;
            let token = thread.select(chat_id.clone(), cached);
            yield Ok(thread_event(&thread, &viewer, group));

            let mut fetch = Some(message_service.history(&chat_id));
            loop {
                let step = match fetch.as_mut() {
                    Some(history) => tokio::select! {
                        res = history => Step::Fetched(res),
                        next = feed.next() => Step::Feed(next),
                    },
                    None => Step::Feed(feed.next().await),
                };

                match step {
                    Step::Fetched(res) => {
                        fetch = None;
                        match res {
                            Ok(history) => {
                                if thread.apply_fetch(&chat_id, token, history) {
                                    message_service.remember(&chat_id, thread.messages()).await;
                                    yield Ok(thread_event(&thread, &viewer, group));
                                }
                            }
                            Err(e) => {
                                error!("Failed to fetch history of chat {chat_id}: {e}");
                                thread.settle();
                                yield Ok(thread_event(&thread, &viewer, group));
                            }
                        }
                    }
                    Step::Feed(Some(Event::MessageInserted { message })) => {
                        let item = thread
                            .on_insert(message)
                            .map(|msg| MessageItem::new(msg, &viewer, group).render().into_string());

                        if let Some(item) = item {
                            message_service.remember(&chat_id, thread.messages()).await;

                            // the first message replaces the empty-thread placeholder
                            if thread.messages().len() == 1 {
                                yield Ok(thread_event(&thread, &viewer, group));
                            } else {
                                yield Ok(sse::Event::default().event("message").data(item));
                            }
                        }
                    }
                    Step::Feed(None) => {
                        debug!("Change feed closed, ending thread of chat {chat_id}");
                        break;
                    }
                }
            }
        };

        Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
    }

    fn thread_event(thread: &Thread, viewer: &user::Id, group: bool) -> sse::Event {
        let markup = MessageList::new(thread.messages(), viewer, group).render();
        sse::Event::default()
            .event("thread")
            .data(markup.into_string())
    }
}
