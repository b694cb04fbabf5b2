//! XML-RPC request parsing and response rendering.

use std::fmt::Write;

use pkgmirror_mirror::IndexRecord;

use crate::error::{Result, SearchError};

/// The search term of a `methodCall`: the text of its first `<string>`.
///
/// Clients send `{"name": [term], "summary": [term]}, "or"`, so the first
/// string is the name term.
pub fn parse_search_term(body: &str) -> Result<String> {
    let doc = roxmltree::Document::parse(body)?;
    doc.descendants()
        .find(|n| n.has_tag_name("string"))
        .map(|n| n.text().unwrap_or_default().trim().to_string())
        .ok_or(SearchError::MissingTerm)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Render matches as a `methodResponse` holding an array of structs.
pub fn render_response<'a>(records: impl IntoIterator<Item = &'a IndexRecord>) -> String {
    let mut out = String::from("<?xml version='1.0'?>\n<methodResponse>\n<params>\n<param>\n<value><array><data>\n");
    for record in records {
        out.push_str("<value><struct>\n");
        out.push_str("<member>\n<name>_pypi_ordering</name>\n<value><boolean>0</boolean></value>\n</member>\n");
        for (name, value) in [
            ("version", &record.version),
            ("name", &record.name),
            ("summary", &record.summary),
        ] {
            // Writing into a String cannot fail.
            let _ = write!(
                out,
                "<member>\n<name>{name}</name>\n<value><string>{}</string></value>\n</member>\n",
                escape(value.trim())
            );
        }
        out.push_str("</struct></value>\n");
    }
    out.push_str("</data></array></value>\n</param>\n</params>\n</methodResponse>\n");
    out
}
