use axum::response::Html;
use axum::Extension;
use maud::{html, Markup};

use super::{error_banner, layout};
use crate::models::{StudentRecord, VISIBLE_STATUSES};
use crate::session::RequireParent;
use crate::AppState;

pub async fn show(
    RequireParent(parent): RequireParent,
    Extension(state): Extension<AppState>,
) -> Html<String> {
    let listing = state
        .backend
        .list_students(parent.id, &VISIBLE_STATUSES)
        .await;
    if let Err(err) = &listing {
        log::error!("Could not load students for parent {}: {}", parent.id, err);
    }

    layout(
        "Parent Dashboard",
        html! {
            div.card.wide {
                div.header {
                    h1 { "Parent Dashboard" }
                    div.actions {
                        a.button.add href="/add-student" { "+ Add Student" }
                        form method="post" action="/logout" {
                            button type="submit" { "Log Out" }
                        }
                    }
                }
                @match &listing {
                    Err(err) => (error_banner(Some(&err.to_string()))),
                    Ok(students) if students.is_empty() => {
                        p.muted { "No pending students found." }
                    }
                    Ok(students) => (student_table(students)),
                }
            }
        },
    )
}

fn student_table(students: &[StudentRecord]) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Name" }
                    th { "Batch" }
                    th { "Class" }
                    th { "Status" }
                    th { "Created" }
                }
            }
            tbody {
                @for student in students {
                    tr {
                        td { (student.name) }
                        td { (student.batch) }
                        td { (student.class_name) }
                        td {
                            span class={ "status status-" (student.status.as_str()) } {
                                (student.status.as_str())
                            }
                        }
                        td { (student.created_at.format("%d/%m/%Y").to_string()) }
                    }
                }
            }
        }
    }
}
