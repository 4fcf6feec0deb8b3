use maud::{Markup, Render, html};

use crate::markup::LocalTime;
use crate::message::markup::{Composer, THREAD_ID};
use crate::{auth, user};

use super::filter::Facets;
use super::model::ChatDto;

const CHAT_LIST_ID: &str = "chat-list";
pub const CHAT_LIST_TARGET: &str = "#chat-list";
const CHAT_PANE_ID: &str = "chat-pane";
const CHAT_PANE_TARGET: &str = "#chat-pane";

/// Up to two uppercase letters taken from the words of a chat name.
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|w| w.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

pub struct Home<'a> {
    user: &'a auth::User,
    cached: &'a [ChatDto],
}

impl<'a> Home<'a> {
    pub fn new(user: &'a auth::User, cached: &'a [ChatDto]) -> Self {
        Self { user, cached }
    }
}

impl Render for Home<'_> {
    fn render(&self) -> Markup {
        html! {
            div ."flex h-full" {
                aside ."w-1/3 min-w-64 flex flex-col border-r bg-white" {
                    (user::markup::Header(self.user))
                    (Filters(&Facets::derive(self.cached)))
                    (NewChat)
                    (ChatList::reconciling(self.cached))
                }
                div #(CHAT_PANE_ID) ."flex-1 flex items-center justify-center text-gray-500" {
                    "Select a chat to view messages."
                }
            }
        }
    }
}

pub struct ChatList<'a> {
    chats: &'a [ChatDto],
    reconcile: bool,
}

impl<'a> ChatList<'a> {
    /// Cached list that replaces itself with the authoritative one on load.
    pub fn reconciling(chats: &'a [ChatDto]) -> Self {
        Self {
            chats,
            reconcile: true,
        }
    }

    pub fn new(chats: &'a [ChatDto]) -> Self {
        Self {
            chats,
            reconcile: false,
        }
    }
}

impl Render for ChatList<'_> {
    fn render(&self) -> Markup {
        html! {
            @if self.reconcile {
                div #(CHAT_LIST_ID) ."flex-1 overflow-y-auto"
                    hx-get="/api/chats"
                    hx-trigger="load"
                    hx-swap="outerHTML"
                {
                    (ChatItems(self.chats))
                }
            } @else {
                div #(CHAT_LIST_ID) ."flex-1 overflow-y-auto" {
                    (ChatItems(self.chats))
                }
            }
        }
    }
}

struct ChatItems<'a>(&'a [ChatDto]);

impl Render for ChatItems<'_> {
    fn render(&self) -> Markup {
        html! {
            @if self.0.is_empty() {
                p ."p-4 text-center text-gray-500" { "No chats found." }
            }
            @for chat in self.0 {
                (ChatItem(chat))
            }
        }
    }
}

pub struct ChatItem<'a>(pub &'a ChatDto);

impl Render for ChatItem<'_> {
    fn render(&self) -> Markup {
        let chat = self.0;
        let last = chat.last_message();

        html! {
            div ."flex items-center p-3 cursor-pointer hover:bg-gray-100 border-b"
                id={"c-" (chat.id())}
                hx-get={"/chats/" (chat.id())}
                hx-target=(CHAT_PANE_TARGET)
                hx-swap="outerHTML"
                _="on click take .bg-green-50"
            {
                div ."w-10 h-10 rounded-full bg-gray-300 flex items-center justify-center mr-3 font-semibold" {
                    (initials(chat.chat_name()))
                }
                div ."flex-1 min-w-0" {
                    div ."flex justify-between" {
                        span ."font-medium truncate" { (chat.chat_name()) }
                        @if let Some(m) = last {
                            span ."text-xs text-gray-500" { (LocalTime(m.created_at())) }
                        }
                    }
                    @if let Some(m) = last {
                        p ."text-sm text-gray-500 truncate" {
                            @if m.content().is_empty() && m.attachment_url().is_some() {
                                i ."fa-solid fa-paperclip mr-1" {}
                                "Attachment"
                            } @else {
                                (m.content())
                            }
                        }
                    }
                    @if !chat.labels().is_empty() {
                        div ."flex gap-1 mt-1" {
                            @for label in chat.labels() {
                                span ."text-xs bg-green-100 text-green-800 rounded px-1" { (label) }
                            }
                        }
                    }
                }
            }
        }
    }
}

struct Filters<'a>(&'a Facets);

impl Render for Filters<'_> {
    fn render(&self) -> Markup {
        html! {
            form #chat-filters ."flex flex-col gap-2 p-3 border-b"
                hx-get="/api/chats/search"
                hx-trigger="input changed delay:300ms, change"
                hx-target=(CHAT_LIST_TARGET)
                hx-swap="outerHTML"
            {
                input ."border border-gray-300 rounded-md p-2"
                    type="search"
                    name="search"
                    placeholder="Search chats" {}
                (FacetSelects(self.0, false))
            }
        }
    }
}

/// Label and member pickers, refreshed out of band whenever the loaded
/// chat list changes.
pub struct FacetSelects<'a>(pub &'a Facets, pub bool);

impl Render for FacetSelects<'_> {
    fn render(&self) -> Markup {
        let facets = self.0;

        html! {
            @if self.1 {
                div #chat-facets ."flex gap-2" hx-swap-oob="true" { (self.selects(facets)) }
            } @else {
                div #chat-facets ."flex gap-2" { (self.selects(facets)) }
            }
        }
    }
}

impl FacetSelects<'_> {
    fn selects(&self, facets: &Facets) -> Markup {
        html! {
            select ."flex-1 border border-gray-300 rounded-md p-1 text-sm" name="label" {
                option value="" { "All labels" }
                @for label in facets.labels() {
                    option value=(label) { (label) }
                }
            }
            select ."flex-1 border border-gray-300 rounded-md p-1 text-sm" name="member" {
                option value="" { "All members" }
                @for member in facets.members() {
                    option value=(member) { (member.short()) }
                }
            }
        }
    }
}

struct NewChat;

impl Render for NewChat {
    fn render(&self) -> Markup {
        html! {
            form #new-chat ."flex flex-col gap-2 p-3 border-b"
                hx-post="/api/chats"
                hx-target=(CHAT_LIST_TARGET)
                hx-swap="afterbegin"
                _="on htmx:afterRequest if event.detail.successful reset() me"
            {
                input ."border border-gray-300 rounded-md p-2"
                    type="text"
                    name="chat_name"
                    placeholder="New chat name"
                    required {}
                input ."border border-gray-300 rounded-md p-2"
                    type="text"
                    name="labels"
                    placeholder="Labels, comma separated" {}
                div ."flex items-center justify-between" {
                    label ."text-sm text-gray-600" {
                        input ."mr-1" type="checkbox" name="is_group" value="true" {}
                        "Group"
                    }
                    input ."bg-green-600 hover:bg-green-500 text-white px-3 py-1 rounded-md cursor-pointer"
                        type="submit"
                        value="Create" {}
                }
            }
        }
    }
}

pub struct Members<'a>(pub &'a ChatDto);

impl Render for Members<'_> {
    fn render(&self) -> Markup {
        html! {
            p #chat-members ."text-xs text-gray-500" {
                @for (i, member) in self.0.members().iter().enumerate() {
                    @if i > 0 { ", " }
                    (member.short())
                }
            }
        }
    }
}

/// Top bar, live thread and composer of the active chat.
pub struct ChatPane<'a> {
    chat: &'a ChatDto,
}

impl<'a> ChatPane<'a> {
    pub fn new(chat: &'a ChatDto) -> Self {
        Self { chat }
    }
}

impl Render for ChatPane<'_> {
    fn render(&self) -> Markup {
        let chat = self.chat;

        html! {
            div #(CHAT_PANE_ID) ."flex-1 flex flex-col h-full" {
                header ."flex items-center justify-between p-3 bg-gray-100 border-b" {
                    div ."flex items-center" {
                        div ."w-10 h-10 rounded-full bg-gray-300 flex items-center justify-center mr-3 font-semibold" {
                            (initials(chat.chat_name()))
                        }
                        div {
                            h2 ."font-medium" { (chat.chat_name()) }
                            (Members(chat))
                        }
                    }
                    form #add-member ."flex gap-1"
                        hx-post={"/api/chats/" (chat.id()) "/members"}
                        hx-target="#chat-members"
                        hx-swap="outerHTML"
                        _="on htmx:afterRequest if event.detail.successful reset() me"
                    {
                        input ."border border-gray-300 rounded-md p-1 text-sm"
                            type="text"
                            name="member"
                            placeholder="Member id"
                            required {}
                        input ."bg-green-600 text-white px-2 rounded-md cursor-pointer text-sm"
                            type="submit"
                            value="Add" {}
                    }
                }

                div ."flex-1 overflow-y-auto p-3 bg-[#efeae2]"
                    hx-ext="sse"
                    sse-connect={"/sse/chats/" (chat.id())}
                {
                    div #(THREAD_ID) sse-swap="thread" hx-swap="innerHTML" {}
                    div ."hidden"
                        sse-swap="message"
                        hx-target={"#" (THREAD_ID)}
                        hx-swap="beforeend" {}
                }

                (Composer(chat.id()))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use super::*;
    use crate::chat;
    use crate::message::{self, model::MessageDto};

    fn uid(n: u128) -> user::Id {
        user::Id::from(Uuid::from_u128(n))
    }

    fn team() -> ChatDto {
        ChatDto::new(
            chat::Id::from(Uuid::from_u128(0xc1)),
            "Team",
            true,
            vec![uid(1), uid(2)],
            vec!["vip".into()],
        )
    }

    #[test]
    fn should_derive_initials_from_chat_name() {
        assert_eq!(initials("design team sync"), "DT");
        assert_eq!(initials("Team"), "T");
        assert_eq!(initials("   "), "");
    }

    #[test]
    fn should_render_chat_item_with_preview() {
        let chat = team().with_last_message(Some(MessageDto::new(
            message::Id::from(Uuid::nil()),
            chat::Id::from(Uuid::from_u128(0xc1)),
            uid(1),
            "see you",
            0,
        )));

        let expected = concat!(
            r##"<div class="flex items-center p-3 cursor-pointer hover:bg-gray-100 border-b" id="c-00000000-0000-0000-0000-0000000000c1" hx-get="/chats/00000000-0000-0000-0000-0000000000c1" hx-target="#chat-pane" hx-swap="outerHTML" _="on click take .bg-green-50">"##,
            r#"<div class="w-10 h-10 rounded-full bg-gray-300 flex items-center justify-center mr-3 font-semibold">T</div>"#,
            r#"<div class="flex-1 min-w-0">"#,
            r#"<div class="flex justify-between">"#,
            r#"<span class="font-medium truncate">Team</span>"#,
            r#"<span class="text-xs text-gray-500"><time datetime="1970-01-01T00:00:00.000Z">00:00</time></span>"#,
            "</div>",
            r#"<p class="text-sm text-gray-500 truncate">see you</p>"#,
            r#"<div class="flex gap-1 mt-1">"#,
            r#"<span class="text-xs bg-green-100 text-green-800 rounded px-1">vip</span>"#,
            "</div>",
            "</div>",
            "</div>"
        );

        let actual = ChatItem(&chat).render().into_string();

        assert_eq!(actual, expected);
    }

    #[test]
    fn should_render_empty_chat_list() {
        let expected = concat!(
            r#"<div class="flex-1 overflow-y-auto" id="chat-list">"#,
            r#"<p class="p-4 text-center text-gray-500">No chats found.</p>"#,
            "</div>"
        );

        let actual = ChatList::new(&[]).render().into_string();

        assert_eq!(actual, expected);
    }

    #[test]
    fn should_reconcile_cached_list_on_load() {
        let actual = ChatList::reconciling(&[]).render().into_string();

        assert!(actual.starts_with(
            r#"<div class="flex-1 overflow-y-auto" id="chat-list" hx-get="/api/chats" hx-trigger="load" hx-swap="outerHTML">"#
        ));
    }

    #[test]
    fn should_render_out_of_band_facets() {
        let facets = Facets::derive(&[team()]);

        let expected = concat!(
            r#"<div class="flex gap-2" id="chat-facets" hx-swap-oob="true">"#,
            r#"<select class="flex-1 border border-gray-300 rounded-md p-1 text-sm" name="label">"#,
            r#"<option value="">All labels</option>"#,
            r#"<option value="vip">vip</option>"#,
            "</select>",
            r#"<select class="flex-1 border border-gray-300 rounded-md p-1 text-sm" name="member">"#,
            r#"<option value="">All members</option>"#,
            r#"<option value="00000000-0000-0000-0000-000000000001">00000000</option>"#,
            r#"<option value="00000000-0000-0000-0000-000000000002">00000000</option>"#,
            "</select>",
            "</div>"
        );

        let actual = FacetSelects(&facets, true).render().into_string();

        assert_eq!(actual, expected);
    }

    #[test]
    fn should_render_members() {
        let actual = Members(&team()).render().into_string();

        assert_eq!(
            actual,
            r#"<p class="text-xs text-gray-500" id="chat-members">00000000, 00000000</p>"#
        );
    }

    #[test]
    fn should_connect_pane_to_thread_stream() {
        let actual = ChatPane::new(&team()).render().into_string();

        assert!(actual.contains(concat!(
            r#"<div class="flex-1 overflow-y-auto p-3 bg-[#efeae2]" hx-ext="sse" sse-connect="/sse/chats/00000000-0000-0000-0000-0000000000c1">"#,
            r#"<div id="thread" sse-swap="thread" hx-swap="innerHTML"></div>"#,
            r##"<div class="hidden" sse-swap="message" hx-target="#thread" hx-swap="beforeend"></div>"##,
            "</div>"
        )));
        assert!(actual.contains(r#"<form class="flex items-center gap-2 p-3 bg-gray-100" id="composer""#));
    }
}
