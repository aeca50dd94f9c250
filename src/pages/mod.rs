//! Server-rendered pages. Every page is a `show` handler for GET and, for forms, a `submit`
//! handler for POST that re-renders the form with an error banner on failure.

pub mod add_student;
pub mod dashboard;
pub mod login;
pub mod register;

use axum::response::Html;
use maud::{html, Markup, PreEscaped, DOCTYPE};

pub const SCHOOL_NAME: &str = "Sekolah Bhinekas";

pub fn layout(title: &str, content: Markup) -> Html<String> {
    let markup = html! {
        (DOCTYPE)
        html lang="id" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="description" content="Parent dashboard and registration system for Sekolah Bhinekas";
                title { (title) " | " (SCHOOL_NAME) }
                style { (PreEscaped(CSS)) }
            }
            body {
                main { (content) }
            }
        }
    };
    Html(markup.into_string())
}

pub fn error_banner(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p.error role="alert" { (message) }
        }
    }
}

/// Disables the submit button once the form is sent.
pub const DISABLE_ON_SUBMIT: &str = "this.querySelector('button[type=submit]').disabled = true";

const CSS: &str = r#"
* { box-sizing: border-box; }
body {
    margin: 0;
    min-height: 100vh;
    background: #f9fafb;
    font-family: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;
    color: #1f2937;
}
main { display: flex; justify-content: center; padding: 2.5rem 1rem; }
.card {
    width: 100%;
    max-width: 28rem;
    background: #fff;
    border-radius: 0.75rem;
    box-shadow: 0 10px 15px rgba(0, 0, 0, 0.1);
    padding: 2rem;
}
.card.wide { max-width: 48rem; }
h1 { font-size: 1.5rem; margin: 0 0 1.5rem; }
label { display: block; font-size: 0.875rem; font-weight: 600; margin-bottom: 0.5rem; color: #374151; }
.field { margin-bottom: 1.5rem; }
input, select {
    width: 100%;
    border: 1px solid #d1d5db;
    border-radius: 0.5rem;
    padding: 0.5rem 1rem;
}
button, .button {
    display: inline-block;
    border: none;
    border-radius: 0.5rem;
    padding: 0.5rem 1rem;
    font-weight: 600;
    color: #fff;
    background: #2563eb;
    text-decoration: none;
    cursor: pointer;
}
form button[type=submit] { width: 100%; }
button:disabled { opacity: 0.6; cursor: wait; }
.button.add { background: #16a34a; }
.error { color: #ef4444; font-size: 0.875rem; text-align: center; }
.muted { color: #4b5563; text-align: center; }
.header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 1.5rem; }
.header h1 { margin: 0; }
.actions { display: flex; gap: 0.75rem; }
.actions form button { width: auto; background: #6b7280; }
table { width: 100%; border-collapse: collapse; }
th { text-align: left; background: #f3f4f6; font-size: 0.875rem; }
th, td { padding: 0.75rem 1rem; border-top: 1px solid #e5e7eb; }
.status { padding: 0.25rem 0.75rem; border-radius: 9999px; font-size: 0.75rem; font-weight: 600; }
.status-pending { background: #fef9c3; color: #854d0e; }
.status-authenticated { background: #dcfce7; color: #166534; }
.status-rejected { background: #fee2e2; color: #b91c1c; }
"#;
