// src/checker/html.rs
// =============================================================================
// This module pulls the raw href values out of an HTML document.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Nothing is resolved or filtered here: hrefs come back exactly as written,
// in document order, so the resolver sees every anchor (including the ones
// it will end up skipping).
// =============================================================================

use scraper::{Html, Selector};
use std::sync::LazyLock;

// "a[href]" means "all <a> tags that have an href attribute"
// The selector is a constant and known to be valid, so a failure here is a
// programmer error
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

// Extracts the href attribute of every <a> element
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//
// Returns: Vec<String> of raw href values, in the order they appear
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='#top'>Top</a>"
//   result = ["/docs", "#top"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
