use axum::extract::{Form, Query};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Extension;
use maud::html;
use serde::Deserialize;

use super::{error_banner, layout, DISABLE_ON_SUBMIT};
use crate::enrollment::{self, Enrollment};
use crate::models::Level;
use crate::session::{current_parent, RequireParent};
use crate::AppState;

const LEVELS: [Level; 2] = [Level::TK, Level::SD];
const SWITCH_LEVEL: &str = "this.form.method='get'; this.form.submit()";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddStudentForm {
    pub name: String,
    pub batch: String,
    pub level: Level,
    pub class_name: String,
}

/// Also answers the level switch, which resubmits the form by GET so typed values survive.
pub async fn show(
    RequireParent(_parent): RequireParent,
    Query(form): Query<AddStudentForm>,
) -> Html<String> {
    render(&form, None)
}

pub async fn submit(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Form(form): Form<AddStudentForm>,
) -> Response {
    let parent = match current_parent(state.backend.as_ref(), &headers).await {
        Ok(Some(parent)) => parent,
        Ok(None) => return render(&form, Some("Not logged in.")).into_response(),
        Err(err) => return render(&form, Some(&err.to_string())).into_response(),
    };

    let class_name = match form.level.class(form.class_name.trim()) {
        Some(class_name) => class_name.to_string(),
        None => return render(&form, Some("Please select a class")).into_response(),
    };
    let batch = match form.batch.trim().parse::<i32>() {
        Ok(batch) => batch,
        Err(_) => return render(&form, Some("Batch must be a number")).into_response(),
    };

    let submission = Enrollment {
        name: form.name.clone(),
        batch,
        class_name,
    };
    let submitted =
        enrollment::submit(state.backend.as_ref(), &state.submissions, &parent, submission).await;
    match submitted {
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(err) => render(&form, Some(&err.to_string())).into_response(),
    }
}

fn render(form: &AddStudentForm, error: Option<&str>) -> Html<String> {
    // A class picked under the other level is dropped from the selection.
    let chosen = form.level.class(form.class_name.trim());
    layout(
        "Add Student",
        html! {
            div.card {
                h1 { "Add Student" }
                (error_banner(error))
                form method="post" action="/add-student" onsubmit=(DISABLE_ON_SUBMIT) {
                    div.field {
                        label for="name" { "Nama Lengkap Anak" }
                        input id="name" type="text" name="name" value=(form.name)
                            placeholder="Masukkan nama lengkap anak" required;
                    }
                    div.field {
                        label for="batch" { "Tahun Masuk Anak" }
                        input id="batch" type="number" name="batch" value=(form.batch)
                            placeholder="Contoh: 2024" required;
                    }
                    div.field {
                        label for="level" { "Level" }
                        select id="level" name="level"
                            onchange=(SWITCH_LEVEL) {
                            @for level in LEVELS {
                                option value=(level.code()) selected[level == form.level] {
                                    (level.label())
                                }
                            }
                        }
                    }
                    div.field {
                        label for="class_name" { "Class Name" }
                        select id="class_name" name="class_name" required {
                            option value="" selected[chosen.is_none()] { "Select Class" }
                            @for class in form.level.classes() {
                                option value=(class) selected[chosen == Some(*class)] { (class) }
                            }
                        }
                    }
                    button type="submit" { "Add Student" }
                }
                p.muted { a href="/dashboard" { "Back to dashboard" } }
            }
        },
    )
}
