use maud::{Markup, Render, html};

use crate::markup::LocalTime;
use crate::{chat, user};

use super::model::MessageDto;

pub const THREAD_ID: &str = "thread";

pub struct MessageItem<'a> {
    msg: &'a MessageDto,
    viewer: &'a user::Id,
    group: bool,
}

impl<'a> MessageItem<'a> {
    pub fn new(msg: &'a MessageDto, viewer: &'a user::Id, group: bool) -> Self {
        Self { msg, viewer, group }
    }
}

impl Render for MessageItem<'_> {
    fn render(&self) -> Markup {
        let own = self.msg.sender_id() == self.viewer;

        html! {
            div ."flex mb-2" .justify-end[own] .justify-start[!own]
                id={"m-" (self.msg.id())}
            {
                div ."max-w-xs rounded-lg px-3 py-2 shadow-sm"
                    ."bg-[#d9fdd3]"[own]
                    ."bg-white border"[!own]
                {
                    @if self.group && !own {
                        p ."text-xs font-semibold text-green-700" { (self.msg.sender_id().short()) }
                    }
                    @if let Some(url) = self.msg.attachment_url() {
                        a ."block text-sm text-blue-600 underline" href=(url) target="_blank" {
                            i ."fa-solid fa-paperclip mr-1" {}
                            "Attachment"
                        }
                    }
                    @if !self.msg.content().is_empty() {
                        p ."whitespace-pre-wrap break-words" { (self.msg.content()) }
                    }
                    div ."flex justify-end items-center gap-1 text-xs text-gray-500" {
                        span { (LocalTime(self.msg.created_at())) }
                        @if own {
                            @if self.msg.seen() {
                                i ."fa-solid fa-check-double text-blue-500" {}
                            } @else {
                                i ."fa-solid fa-check" {}
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Contents of the thread container, oldest message first.
pub struct MessageList<'a> {
    messages: &'a [MessageDto],
    viewer: &'a user::Id,
    group: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [MessageDto], viewer: &'a user::Id, group: bool) -> Self {
        Self {
            messages,
            viewer,
            group,
        }
    }
}

impl Render for MessageList<'_> {
    fn render(&self) -> Markup {
        html! {
            @if self.messages.is_empty() {
                p #empty-thread ."text-center text-gray-500 mt-4" {
                    "No messages yet. Start the conversation!"
                }
            } @else {
                @for msg in self.messages {
                    (MessageItem::new(msg, self.viewer, self.group))
                }
            }
        }
    }
}

pub struct Composer<'a>(pub &'a chat::Id);

impl Render for Composer<'_> {
    fn render(&self) -> Markup {
        html! {
            form #composer ."flex items-center gap-2 p-3 bg-gray-100"
                hx-post="/api/messages"
                hx-encoding="multipart/form-data"
                hx-swap="outerHTML"
            {
                input type="hidden" name="chat_id" value=(self.0) {}
                label ."cursor-pointer text-gray-600" {
                    i ."fa-solid fa-paperclip" {}
                    input ."hidden" type="file" name="file" {}
                }
                input ."border border-gray-300 rounded-md p-2 flex-1"
                    type="text"
                    name="text"
                    autocomplete="off"
                    placeholder="Type a message" {}
                input ."bg-green-600 hover:bg-green-500 text-white px-4 py-2 rounded-md cursor-pointer"
                    type="submit"
                    value="Send" {}
            }
        }
    }
}
