use maud::{Markup, Render, html};

const AUTH_ERROR_ID: &str = "auth-error";
const AUTH_ERROR_TARGET: &str = "#auth-error";

/// Inline feedback shown under the login form.
pub enum Notice {
    Error(String),
    Info(String),
}

impl Render for Notice {
    fn render(&self) -> Markup {
        match self {
            Notice::Error(msg) => html! { p ."text-sm text-red-600" role="alert" { (msg) } },
            Notice::Info(msg) => html! { p ."text-sm text-green-700" { (msg) } },
        }
    }
}

#[derive(Default)]
pub struct Login {
    notice: Option<Notice>,
}

impl Login {
    pub fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
        }
    }
}

impl Render for Login {
    fn render(&self) -> Markup {
        html! {
            div ."h-full flex justify-center items-center" {
                form #login-form ."flex flex-col gap-3 w-72"
                    hx-post="/api/auth/sign-in"
                    hx-target=(AUTH_ERROR_TARGET)
                {
                    h1 ."text-2xl font-bold text-center" { "Sign in" }
                    input ."border border-gray-300 rounded-md p-2"
                        type="email"
                        name="email"
                        placeholder="Email"
                        required {}
                    input ."border border-gray-300 rounded-md p-2"
                        type="password"
                        name="password"
                        placeholder="Password" {}

                    div #(AUTH_ERROR_ID) {
                        @if let Some(notice) = &self.notice {
                            (notice)
                        }
                    }

                    input ."bg-green-600 hover:bg-green-500 text-white font-bold py-2 rounded cursor-pointer"
                        type="submit"
                        value="Sign in" {}
                    button ."border border-green-600 text-green-700 py-2 rounded"
                        type="button"
                        hx-post="/api/auth/sign-up"
                        hx-target=(AUTH_ERROR_TARGET) { "Sign up" }
                    button ."text-sm text-gray-600 hover:underline"
                        type="button"
                        hx-post="/api/auth/magic-link"
                        hx-target=(AUTH_ERROR_TARGET) { "Email me a magic link" }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_render_error_notice() {
        let actual = Notice::Error("Invalid login credentials".into())
            .render()
            .into_string();

        assert_eq!(
            actual,
            r#"<p class="text-sm text-red-600" role="alert">Invalid login credentials</p>"#
        );
    }

    #[test]
    fn should_render_login_form() {
        let expected = concat!(
            r#"<div class="h-full flex justify-center items-center">"#,
            r##"<form class="flex flex-col gap-3 w-72" id="login-form" hx-post="/api/auth/sign-in" hx-target="#auth-error">"##,
            r#"<h1 class="text-2xl font-bold text-center">Sign in</h1>"#,
            r#"<input class="border border-gray-300 rounded-md p-2" type="email" name="email" placeholder="Email" required></input>"#,
            r#"<input class="border border-gray-300 rounded-md p-2" type="password" name="password" placeholder="Password"></input>"#,
            r#"<div id="auth-error"><p class="text-sm text-green-700">Check your email</p></div>"#,
            r#"<input class="bg-green-600 hover:bg-green-500 text-white font-bold py-2 rounded cursor-pointer" type="submit" value="Sign in"></input>"#,
            r##"<button class="border border-green-600 text-green-700 py-2 rounded" type="button" hx-post="/api/auth/sign-up" hx-target="#auth-error">Sign up</button>"##,
            r##"<button class="text-sm text-gray-600 hover:underline" type="button" hx-post="/api/auth/magic-link" hx-target="#auth-error">Email me a magic link</button>"##,
            "</form>",
            "</div>"
        );

        let actual = Login::with_notice(Notice::Info("Check your email".into()))
            .render()
            .into_string();

        assert_eq!(actual, expected);
    }
}
