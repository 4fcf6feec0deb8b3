use maud::{Markup, Render, html};

use crate::auth;

pub struct Header<'a>(pub &'a auth::User);

impl Render for Header<'_> {
    fn render(&self) -> Markup {
        let email = self.0.email();

        html! {
            header #user-header ."flex items-center justify-between p-3 bg-gray-100" {
                ."flex items-center" {
                    ."w-10 h-10 rounded-full bg-green-600 text-white flex items-center justify-center mr-3" {
                        (email.initials())
                    }
                    span ."text-sm font-medium" { (email) }
                }
                a ."text-sm text-red-600 hover:underline" href="/logout" { "Log out" }
            }
        }
    }
}
