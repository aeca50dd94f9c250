use axum::extract::Form;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Extension;
use maud::html;
use serde::Deserialize;

use super::{error_banner, layout, DISABLE_ON_SUBMIT};
use crate::auth::signed_in_redirect;
use crate::validation::validate_login;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn show() -> Html<String> {
    render(&LoginForm::default(), None)
}

pub async fn submit(
    Extension(state): Extension<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(err) = validate_login(&form.email, &form.password) {
        return render(&form, Some(&err.to_string())).into_response();
    }

    match state.backend.sign_in(&form.email, &form.password).await {
        Ok(session) => {
            log::info!("Parent {} signed in", session.belongs_to);
            signed_in_redirect(&state.cookies, &session, "/dashboard")
        }
        Err(err) => {
            log::warn!("Sign-in for {} failed: {}", form.email, err);
            render(&form, Some(&err.to_string())).into_response()
        }
    }
}

/// `/login` is kept as an alias of the login page at `/`.
pub async fn alias() -> Redirect {
    Redirect::permanent("/")
}

fn render(form: &LoginForm, error: Option<&str>) -> Html<String> {
    layout(
        "Log In",
        html! {
            div.card {
                h1 { "Log In" }
                (error_banner(error))
                form method="post" action="/" onsubmit=(DISABLE_ON_SUBMIT) {
                    div.field {
                        label for="email" { "Email" }
                        input id="email" type="email" name="email" value=(form.email)
                            placeholder="Enter your email" required;
                    }
                    div.field {
                        label for="password" { "Password" }
                        input id="password" type="password" name="password"
                            placeholder="Enter your password" required;
                    }
                    button type="submit" { "Log In" }
                }
                p.muted {
                    "Don't have an account? "
                    a href="/register" { "Register" }
                }
            }
        },
    )
}
