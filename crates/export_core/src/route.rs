/// Extensions exported verbatim and rendered without waiting for a page lifecycle.
pub const SPECIAL_EXTENSIONS: &[&str] = &[".xml", ".json"];

const INDEX_FILE: &str = "index.html";

/// Returns true when the route targets a non-page resource such as a feed or sitemap.
pub fn is_special_route(route: &str) -> bool {
    SPECIAL_EXTENSIONS.iter().any(|ext| route.ends_with(ext))
}

/// Map a route to the file path its output is written to.
///
/// `/x.html`, `/feed.xml` and `/data.json` are kept as-is. Everything else is
/// treated as a directory: `/about` and `/about/` both become `/about/index.html`.
pub fn route_to_file(route: &str) -> String {
    if route.ends_with(".html") || is_special_route(route) {
        return route.to_string();
    }
    let base = route.strip_suffix('/').unwrap_or(route);
    format!("{base}/{INDEX_FILE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_and_special_routes_are_verbatim() {
        assert_eq!(route_to_file("/x.html"), "/x.html");
        assert_eq!(route_to_file("/data.json"), "/data.json");
        assert_eq!(route_to_file("/sitemap.xml"), "/sitemap.xml");
    }

    #[test]
    fn directory_routes_get_index_file() {
        assert_eq!(route_to_file("/about"), "/about/index.html");
        assert_eq!(route_to_file("/about/"), "/about/index.html");
        assert_eq!(route_to_file("/"), "/index.html");
        assert_eq!(route_to_file(""), "/index.html");
    }

    #[test]
    fn extension_must_be_a_suffix() {
        assert_eq!(route_to_file("/feed.xml/page"), "/feed.xml/page/index.html");
        assert!(!is_special_route("/feed.xml/page"));
        assert!(is_special_route("/feed.xml"));
        assert!(!is_special_route("/index.html"));
    }
}
