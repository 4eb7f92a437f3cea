use std::sync::LazyLock;

use export_logging::export_trace;
use regex::Regex;
use url::{ParseError, Url};

/// Placeholder origin used to resolve relative references; never fetched.
const SCAN_ORIGIN: &str = "http://export.invalid";

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a\s(.+?)>").expect("anchor pattern is valid"));

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*(?:"(.*?)"|'(.*?)'|([^\s>]*))"#).expect("href pattern is valid")
});

/// Lazily scan `html` for same-origin links, resolving relative references
/// against `route`.
///
/// The returned iterator is cheap to clone; a clone restarts from the position
/// it was taken at.
pub fn extract_links<'a>(html: &'a str, route: &str) -> Links<'a> {
    let base = Url::parse(SCAN_ORIGIN)
        .ok()
        .and_then(|origin| origin.join(route).ok());
    Links { html, base, pos: 0 }
}

/// Iterator over the routes referenced by anchor tags of one document.
#[derive(Debug, Clone)]
pub struct Links<'a> {
    html: &'a str,
    base: Option<Url>,
    pos: usize,
}

impl Iterator for Links<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.html.len() {
            let caps = ANCHOR_RE.captures_at(self.html, self.pos)?;
            let whole = caps.get(0)?;
            self.pos = whole.end();
            let Some(attrs) = caps.get(1) else {
                continue;
            };
            if let Some(route) = href_value(attrs.as_str()).and_then(|href| self.resolve(href)) {
                return Some(route);
            }
        }
        None
    }
}

impl Links<'_> {
    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || href.starts_with('?') {
            return None;
        }
        match Url::parse(href) {
            // Any absolute reference either names a host or is not a page route.
            Ok(_) => None,
            Err(ParseError::RelativeUrlWithoutBase) => {
                let base = self.base.as_ref()?;
                let joined = base.join(href).ok()?;
                if joined.host_str() != base.host_str() {
                    return None;
                }
                let path = joined.path();
                (!path.is_empty()).then(|| path.to_string())
            }
            Err(err) => {
                export_trace!("skipping malformed href {href:?}: {err}");
                None
            }
        }
    }
}

/// First `href=` assignment in an attribute list: double-quoted, then
/// single-quoted, then unquoted.
pub fn href_value(attrs: &str) -> Option<&str> {
    let caps = HREF_RE.captures(attrs)?;
    [1, 2, 3]
        .into_iter()
        .filter_map(|idx| caps.get(idx))
        .map(|m| m.as_str())
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_quote_priority() {
        assert_eq!(href_value(r#"href="/a""#), Some("/a"));
        assert_eq!(href_value("href='/b'"), Some("/b"));
        assert_eq!(href_value("href=/c class=x"), Some("/c"));
        assert_eq!(href_value(r#"class="x" href = "/d""#), Some("/d"));
        assert_eq!(href_value(r#"class="x""#), None);
        assert_eq!(href_value(r#"href="""#), None);
    }

    #[test]
    fn clone_restarts_from_same_position() {
        let html = r#"<a href="/one">1</a><a href="/two">2</a>"#;
        let mut links = extract_links(html, "/");
        let snapshot = links.clone();
        assert_eq!(links.next().as_deref(), Some("/one"));
        assert_eq!(snapshot.collect::<Vec<_>>(), vec!["/one", "/two"]);
    }
}
