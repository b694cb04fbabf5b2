//! Catalog lister: the full set of package names, fetched once per run.

use std::collections::HashSet;
use std::time::Duration;

use once_cell::sync::Lazy;
use pkgmirror_fetch::HttpClient;
use regex::Regex;

use crate::error::{MirrorError, Result};
use crate::name::PackageName;

static ANCHOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>(?<text>.*?)</a\s*>").expect("valid anchor regex"));

/// Fetch the catalog page and return its package names in document order.
///
/// There is no retry here: the run cannot start without the catalog.
pub async fn fetch_catalog<C: HttpClient>(
    client: &C,
    url: &str,
    timeout: Duration,
) -> Result<Vec<PackageName>> {
    let body = client
        .get(url, timeout)
        .await
        .map_err(|source| MirrorError::Catalog {
            url: url.to_string(),
            source,
        })?;
    let text = std::str::from_utf8(&body).map_err(|_| MirrorError::CatalogEncoding {
        url: url.to_string(),
    })?;

    let names = parse_catalog(text);
    tracing::info!(url, packages = names.len(), "catalog listed");
    Ok(names)
}

/// Extract anchor texts as package names.
///
/// Well-formed XHTML goes through an XML parser; anything else (the usual
/// HTML5 index page with void `<meta>` tags) falls back to an anchor scan.
/// Names that cannot be used as a directory are dropped, as is any name whose
/// lowercase form was already listed: the first spelling owns the entry.
pub fn parse_catalog(document: &str) -> Vec<PackageName> {
    let texts = match roxmltree::Document::parse(document) {
        Ok(doc) => doc
            .descendants()
            .filter(|n| n.is_element() && n.has_tag_name("a"))
            .map(|n| collect_text(&n))
            .collect::<Vec<_>>(),
        Err(e) => {
            tracing::debug!(error = %e, "catalog is not well-formed XML, scanning anchors");
            ANCHOR_REGEX
                .captures_iter(document)
                .filter_map(|caps| caps.name("text"))
                .map(|m| unescape(m.as_str()))
                .collect()
        }
    };

    let mut seen = HashSet::new();
    texts
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter_map(|t| match PackageName::new(t) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!(error = %e, "skipping catalog entry");
                None
            }
        })
        .filter(|name| seen.insert(name.normalized().to_string()))
        .collect()
}

fn collect_text(node: &roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn unescape(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(names: &[PackageName]) -> Vec<&str> {
        names.iter().map(PackageName::canonical).collect()
    }

    #[test]
    fn test_parse_xml_catalog() {
        let doc = r#"<html><head><title>Simple Index</title></head><body>
            <a href="/simple/Foo/">Foo</a>
            <a href="/simple/bar/">bar</a>
        </body></html>"#;

        let names = parse_catalog(doc);
        assert_eq!(canonical(&names), vec!["Foo", "bar"]);
        assert_eq!(names[0].normalized(), "foo");
    }

    #[test]
    fn test_parse_html5_catalog() {
        let doc = r#"<!DOCTYPE html>
<html>
  <head>
    <meta name="pypi:repository-version" content="1.1">
    <title>Simple index</title>
  </head>
  <body>
    <a href="/simple/0/">0</a>
    <a href="/simple/a-b/">A-B</a>
    <a href="/simple/x-y/">x&amp;y</a>
  </body>
</html>"#;

        assert_eq!(canonical(&parse_catalog(doc)), vec!["0", "A-B", "x&y"]);
    }

    #[test]
    fn test_parse_drops_duplicates_and_unsafe_names() {
        let doc = "<root><a>six</a><a>../etc</a><a> </a><a>six</a><a>Six</a></root>";
        assert_eq!(canonical(&parse_catalog(doc)), vec!["six"]);

        let doc = "<root><a>Six</a><a>six</a><a>SIX</a></root>";
        assert_eq!(canonical(&parse_catalog(doc)), vec!["Six"]);
    }

    #[test]
    fn test_parse_empty_catalog() {
        assert!(parse_catalog("<html><body></body></html>").is_empty());
        assert!(parse_catalog("").is_empty());
    }
}
