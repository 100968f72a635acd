//! Response helpers shared by the takes.
//!
//! # Responsibilities
//! - Escape untrusted text for HTML bodies
//! - Wrap a body fragment in a minimal page
//!
//! # Design Decisions
//! - Pages are plain strings; no template engine in the front door

use axum::response::Html;

/// Escape `text` for use inside HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal HTML page. `body` must already be escaped.
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
        escape(title),
        body
    ))
}
