// src/checker/resolve.rs
// =============================================================================
// This module decides what an href points at.
//
// Every raw href ends up in exactly one of three buckets:
// - Skip: mailto:, tel:, javascript:, in-page anchors (#...), empty hrefs
//   and anything else that is not a web link
// - External: absolute http(s) URLs and scheme-relative //host/... URLs
// - Internal: everything else, resolved to a root-relative site path
//
// The resolved string doubles as the cache key and the report key, so every
// spelling of the same page must collapse to the same string:
//   /about, /about/, /about/index.html, /about.html  ->  /about
//
// Rust concepts:
// - Enums with data: Resolution carries the target only where one exists
// - thiserror: a small typed error for hrefs that can't be resolved
// - LazyLock: a value built once, the first time it is used
// =============================================================================

use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

// Hrefs with these prefixes never leave the page or never hit the web
const SKIPPED_PREFIXES: &[&str] = &["mailto:", "tel:", "javascript:", "#"];

// Internal links are joined against this made-up origin so that "../x",
// "x" and "/x" all come out as a plain root-relative path
static SYNTHETIC_ROOT: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("http://site.invalid/").expect("synthetic root is a valid URL")
});

/// Which way a resolved link gets verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Checked over the network
    External,
    /// Checked against the site itself (build output or dev routes)
    Internal,
}

/// Outcome of classifying one href.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not a link we check (mailto:, #anchor, empty, ...)
    Skip,
    /// A checkable target plus how to check it
    Target { kind: LinkKind, target: String },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

// Classifies and resolves a raw href found in a document
//
// Parameters:
//   href: the attribute value exactly as it appeared in the markup
//   base: location of the document the href was found in
//
// Returns: Skip, an External URL or an Internal site path, or an error for
// hrefs that can't be turned into either
//
// Examples (base = http://localhost:4321/blog/post):
//   "mailto:a@b.com"         -> Skip
//   "https://rust-lang.org"  -> External "https://rust-lang.org/"
//   "//cdn.example.com/x"    -> External "https://cdn.example.com/x"
//   "../about/"              -> Internal "/about"
//   "other.html?x=1#top"     -> Internal "/blog/other"
pub fn resolve(href: &str, base: &Url) -> Result<Resolution, ResolveError> {
    let href = href.trim();

    if href.is_empty() || SKIPPED_PREFIXES.iter().any(|p| href.starts_with(p)) {
        return Ok(Resolution::Skip);
    }

    let invalid = |source| ResolveError::InvalidUrl {
        href: href.to_string(),
        source,
    };

    if is_network_url(href) {
        let mut url = if href.starts_with("//") {
            Url::parse(&format!("https:{}", href)).map_err(invalid)?
        } else {
            Url::parse(href).map_err(invalid)?
        };

        // ftp://, file:// and friends are not something we can probe
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(Resolution::Skip);
        }

        // The fragment never reaches the server
        url.set_fragment(None);
        return Ok(Resolution::Target {
            kind: LinkKind::External,
            target: url.to_string(),
        });
    }

    // Other absolute schemes without "//" (data:, sms:, ...) are not web links
    if let Ok(url) = Url::parse(href) {
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(Resolution::Skip);
        }
    }

    // Only the document's path matters, its host is irrelevant here
    let anchor = SYNTHETIC_ROOT.join(base.path()).map_err(invalid)?;
    let resolved = anchor.join(href).map_err(invalid)?;

    Ok(Resolution::Target {
        kind: LinkKind::Internal,
        target: normalize_path(resolved.path()),
    })
}

// True for "proto://..." and "//..." hrefs
fn is_network_url(href: &str) -> bool {
    if href.starts_with("//") {
        return true;
    }

    match href.split_once("://") {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

// Normalizes a site path (or document identifier) to its canonical form
//
// Rules, applied until nothing changes:
// - drop everything from the first '?' or '#'
// - drop a trailing "/index.html", then a trailing ".html"
// - drop trailing slashes (the root stays "/")
//
// Examples:
//   "/about/"            -> "/about"
//   "/about/index.html"  -> "/about"
//   "/about.html"        -> "/about"
//   "/index.html"        -> "/"
//   "/docs?page=2#top"   -> "/docs"
pub fn normalize_path(path: &str) -> String {
    let mut current = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_string();

    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(path: &str) -> String {
    let mut path = path;

    if let Some(stripped) = path.strip_suffix("/index.html") {
        path = stripped;
    } else if path == "index.html" {
        path = "";
    }
    if let Some(stripped) = path.strip_suffix(".html") {
        path = stripped;
    }

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:4321/blog/post").unwrap()
    }

    fn internal(target: &str) -> Resolution {
        Resolution::Target {
            kind: LinkKind::Internal,
            target: target.to_string(),
        }
    }

    fn external(target: &str) -> Resolution {
        Resolution::Target {
            kind: LinkKind::External,
            target: target.to_string(),
        }
    }

    #[test]
    fn test_skip_non_web_links() {
        for href in [
            "mailto:a@b.com",
            "tel:+123456",
            "javascript:void(0)",
            "#section",
            "",
            "   ",
            "data:text/plain,hi",
            "ftp://files.example.com/x",
        ] {
            assert_eq!(resolve(href, &base()).unwrap(), Resolution::Skip, "{href}");
        }
    }

    #[test]
    fn test_external_links() {
        assert_eq!(
            resolve("https://www.rust-lang.org", &base()).unwrap(),
            external("https://www.rust-lang.org/")
        );
        assert_eq!(
            resolve("https://example.com/a?b=1#frag", &base()).unwrap(),
            external("https://example.com/a?b=1")
        );
        assert_eq!(
            resolve("//cdn.example.com/lib.js", &base()).unwrap(),
            external("https://cdn.example.com/lib.js")
        );
    }

    #[test]
    fn test_internal_spellings_collapse() {
        for href in ["/about", "/about/", "/about/index.html", "/about.html", "../about"] {
            assert_eq!(resolve(href, &base()).unwrap(), internal("/about"), "{href}");
        }
    }

    #[test]
    fn test_internal_relative_to_document() {
        let base = Url::parse("http://localhost/blog/").unwrap();
        assert_eq!(resolve("post?x=1#top", &base).unwrap(), internal("/blog/post"));

        let file_base = Url::parse("file:///docs/guide/index.html").unwrap();
        assert_eq!(resolve("setup.html", &file_base).unwrap(), internal("/docs/guide/setup"));
        assert_eq!(resolve("/", &file_base).unwrap(), internal("/"));
    }

    #[test]
    fn test_cannot_escape_site_root() {
        assert_eq!(resolve("../../../../etc/passwd", &base()).unwrap(), internal("/etc/passwd"));
    }

    #[test]
    fn test_malformed_external_is_error() {
        let result = resolve("http://[not-an-ip/", &base());
        assert!(matches!(result, Err(ResolveError::InvalidUrl { .. })));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for path in [
            "/about/",
            "/about/index.html",
            "/about.html",
            "/index.html",
            "/a/index.html.html",
            "/docs?page=2#top",
            "index.html",
            "/",
        ] {
            let once = normalize_path(path);
            assert_eq!(normalize_path(&once), once, "{path}");
        }
        assert_eq!(normalize_path("/about/index.html"), "/about");
        assert_eq!(normalize_path("/index.html"), "/");
        assert_eq!(normalize_path("/a/index.html.html"), "/a");
    }
}
