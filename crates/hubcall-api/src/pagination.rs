//! `Link` header pagination.
//!
//! GitHub advertises further pages as comma-separated
//! `<url>; rel="reltype"` segments. Only `rel="next"` is followed.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::HeaderMap;
use url::Url;

/// Regex for parsing RFC 5988 `Link` header relations.
static LINK_REL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>;\s*rel="([^"]+)""#).expect("LINK_REL_RE is a valid regex")
});

/// Find the URL for `rel` in a `Link` header value.
pub fn find_rel(link_header: &str, rel: &str) -> Option<String> {
    LINK_REL_RE
        .captures_iter(link_header)
        .find(|cap| cap.get(2).is_some_and(|m| m.as_str() == rel))
        .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()))
}

/// Whether a link's `page` query parameter is `1`.
///
/// Some endpoints advertise a `next` link pointing back to the first page;
/// following it would loop.
pub fn points_to_first_page(link: &str) -> bool {
    Url::parse(link).is_ok_and(|u| u.query_pairs().any(|(k, v)| k == "page" && v == "1"))
}

/// The next page to fetch, if the response advertises one worth following.
pub fn next_page_link(headers: &HeaderMap) -> Option<String> {
    let link_header = headers.get("link")?.to_str().ok()?;
    find_rel(link_header, "next").filter(|next| !points_to_first_page(next))
}
