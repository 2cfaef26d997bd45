//! Server-rendered HTML.
//!
//! Every value that came from a user or the database goes through
//! [`escape`] before it is placed in markup.

/// Administrator pages
pub mod admin;
/// Passenger pages
pub mod passenger;
/// Ticketing desk pages
pub mod ticketing;

use axum::{http::StatusCode, response::Html};

/// Escapes text for use in HTML content and double-quoted attributes.
#[must_use]
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

/// Wraps `body` in the site layout.
#[must_use]
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} | Fare Desk</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Fare Desk</a> <a href=\"/passenger/dashboard\">Passengers</a> \
         <a href=\"/ticketing/passengers\">Ticketing</a> <a href=\"/admin/\">Administration</a></nav>\n\
         <main>\n<h1>{title}</h1>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

const STYLE: &str = "body{font-family:sans-serif;margin:0}nav{background:#234;padding:.6em}\
nav a{color:#fff;margin-right:1em}main{padding:1em 2em}table{border-collapse:collapse}\
td,th{border:1px solid #ccc;padding:.3em .6em}.error{color:#a00;font-weight:bold}\
.muted{color:#777}label{display:block;margin-top:.6em}";

/// The error banner of a form, empty without a message.
#[must_use]
pub fn error_banner(message: Option<&str>) -> String {
    message.map_or_else(String::new, |m| {
        format!("<p class=\"error\" role=\"alert\">{}</p>", escape(m))
    })
}

/// A `<select>` with `selected` pre-chosen.
#[must_use]
pub fn select<'a>(
    name: &str,
    options: impl IntoIterator<Item = (String, &'a str)>,
    selected: Option<&str>,
) -> String {
    let mut html = format!("<select name=\"{}\" id=\"{}\">", escape(name), escape(name));
    for (value, label) in options {
        let chosen = if Some(value.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{chosen}>{}</option>",
            escape(&value),
            escape(label)
        ));
    }
    html.push_str("</select>");
    html
}

/// Builds a table from a header row and pre-rendered cells.
///
/// Cells are inserted as is; callers escape their content.
#[must_use]
pub fn table(headers: &[&str], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        return format!("<p class=\"muted\">{}</p>", escape(empty));
    }
    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// A link with escaped target and text.
#[must_use]
pub fn link(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(href), escape(text))
}

/// Landing page linking the three personas.
#[must_use]
pub fn home() -> Html<String> {
    page(
        "Welcome",
        "<ul>\
         <li><a href=\"/passenger/register\">Register as a passenger</a></li>\
         <li><a href=\"/passenger/dashboard\">Passenger dashboard</a></li>\
         <li><a href=\"/ticketing/passengers\">Ticketing desk</a></li>\
         <li><a href=\"/admin/\">Administration</a></li>\
         </ul>",
    )
}

/// Error page for a failed request.
#[must_use]
pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    page(
        title,
        &format!(
            "<p class=\"error\">{}</p><p><a href=\"/\">Back to the start page</a></p>",
            escape(message)
        ),
    )
}
