use axum::extract::Form;
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use maud::html;
use serde::Deserialize;

use super::{error_banner, layout, DISABLE_ON_SUBMIT};
use crate::auth::signed_in_redirect;
use crate::validation::validate_registration;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub retype_password: String,
}

pub async fn show() -> Html<String> {
    render(&RegisterForm::default(), None)
}

pub async fn submit(
    Extension(state): Extension<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(err) = validate_registration(&form.email, &form.password, &form.retype_password) {
        return render(&form, Some(&err.to_string())).into_response();
    }

    match state.backend.sign_up(&form.email, &form.password).await {
        Ok(session) => {
            log::info!("Registered parent {}", session.belongs_to);
            signed_in_redirect(&state.cookies, &session, "/dashboard")
        }
        Err(err) => {
            log::warn!("Registration for {} failed: {}", form.email, err);
            render(&form, Some(&err.to_string())).into_response()
        }
    }
}

fn render(form: &RegisterForm, error: Option<&str>) -> Html<String> {
    layout(
        "Register",
        html! {
            div.card {
                h1 { "Register" }
                (error_banner(error))
                form method="post" action="/register" onsubmit=(DISABLE_ON_SUBMIT) {
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
                    div.field {
                        label for="retype_password" { "Retype Password" }
                        input id="retype_password" type="password" name="retype_password"
                            placeholder="Retype your password" required;
                    }
                    button type="submit" { "Register" }
                }
                p.muted {
                    "Already registered? "
                    a href="/" { "Log In" }
                }
            }
        },
    )
}
