// src/extractors/text.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{node::Node, ElementRef, Html, Selector};

use crate::utils::error::ExtractError;

// --- Constants ---
/// Below this many characters of normalized text, a filing is considered
/// unusable: it is almost certainly a stub page or a failed download.
pub const MIN_TEXT_LEN: usize = 1000;

// Elements whose text must never reach the output.
const SKIP_TAGS: &[&str] = &["script", "style", "head", "meta", "link", "noscript", "title"];

// Elements that imply a line break around their content.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "tr", "table", "li", "ul", "ol", "section", "h1", "h2", "h3", "h4", "h5",
    "h6", "hr",
];

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to compile BODY_SELECTOR"));

// Inline-XBRL fact wrappers (<ix:nonFraction>, <ix:nonNumeric>) confuse the
// HTML parser; stripping the tags keeps their inner text in place.
static IX_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?ix:[a-zA-Z]+[^>]*>").expect("Failed to compile IX_TAG_RE"));

static MULTI_SPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("Failed to compile MULTI_SPACE_RE"));

/// Reduces filing markup to normalized plain text for chunking.
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Extracts normalized text from one filing document.
    ///
    /// Fails with `InsufficientContent` when the result is below
    /// [`MIN_TEXT_LEN`] rather than handing a degenerate document downstream.
    pub fn extract_text(&self, html_content: &str) -> Result<String, ExtractError> {
        let stripped = IX_TAG_RE.replace_all(html_content, "");
        let document = Html::parse_document(&stripped);

        let mut raw = String::new();
        // Prefer the <body>; fall back to the whole tree for fragment-like docs.
        if let Some(body) = document.select(&BODY_SELECTOR).next() {
            collect_visible_text(body, &mut raw);
        } else {
            let root = document.root_element();
            collect_visible_text(root, &mut raw);
        }

        let text = normalize_text(&raw);

        if text.len() < MIN_TEXT_LEN {
            tracing::warn!(
                "Normalized text is only {} characters; treating as unusable",
                text.len()
            );
            return Err(ExtractError::InsufficientContent {
                len: text.len(),
                min: MIN_TEXT_LEN,
            });
        }

        tracing::info!("Extracted {} characters of normalized text", text.len());
        Ok(text)
    }
}

/// Walks the subtree under `scope`, appending text nodes that are not inside
/// skipped elements, with newlines around block-level elements.
fn collect_visible_text(scope: ElementRef, out: &mut String) {
    for node in scope.descendants() {
        match node.value() {
            Node::Element(element) => {
                if BLOCK_TAGS.contains(&element.name()) {
                    out.push('\n');
                }
            }
            Node::Text(text) => {
                // Check the ancestor chain for skipped containers.
                let mut skipped = false;
                for ancestor_node in node.ancestors() {
                    if let Some(ancestor) = ElementRef::wrap(ancestor_node) {
                        if SKIP_TAGS.contains(&ancestor.value().name()) {
                            skipped = true;
                            break;
                        }
                    }
                }
                if !skipped {
                    out.push_str(text);
                }
            }
            _ => {} // Ignore comments, etc.
        }
    }
}

/// Line-level cleanup: trims whitespace, drops one-character noise lines,
/// and collapses repeated spaces. A run of dropped lines is kept as a single
/// blank line so paragraph boundaries survive into chunking.
fn normalize_text(raw: &str) -> String {
    let mut out = String::new();
    let mut paragraph_break = false;
    for line in raw.lines() {
        let line = line.trim();
        if line.len() > 1 {
            if !out.is_empty() {
                out.push_str(if paragraph_break { "\n\n" } else { "\n" });
            }
            out.push_str(line);
            paragraph_break = false;
        } else {
            paragraph_break = true;
        }
    }

    MULTI_SPACE_RE.replace_all(&out, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_body(inner: &str) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>T</title><style>p {{ color: red }}</style></head>\
             <body>{}</body></html>",
            inner
        )
    }

    #[test]
    fn test_strips_script_and_style_content() {
        let padding = "Oil and gas operating results. ".repeat(60);
        let html = wrap_body(&format!(
            "<script>var secret = 1;</script><p>{}</p><noscript>enable js</noscript>",
            padding
        ));

        let text = TextExtractor::new().extract_text(&html).unwrap();
        assert!(text.contains("Oil and gas operating results."));
        assert!(!text.contains("var secret"));
        assert!(!text.contains("enable js"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_inline_xbrl_tags_keep_their_values() {
        let padding = "Production discussion follows in detail. ".repeat(50);
        let html = wrap_body(&format!(
            "<p>Oil production was <ix:nonFraction name=\"us-gaap:Oil\" scale=\"0\">148.4</ix:nonFraction> MBbl/d</p><p>{}</p>",
            padding
        ));

        let text = TextExtractor::new().extract_text(&html).unwrap();
        assert!(text.contains("148.4"));
        assert!(!text.contains("ix:nonFraction"));
    }

    #[test]
    fn test_block_elements_separate_lines() {
        let padding = "Supplementary operational information. ".repeat(60);
        let html = wrap_body(&format!(
            "<div>First block of content here</div><div>Second block of content here</div><p>{}</p>",
            padding
        ));

        let text = TextExtractor::new().extract_text(&html).unwrap();
        let first = text.find("First block").unwrap();
        let second = text.find("Second block").unwrap();
        assert!(text[first..second].contains('\n'));
    }

    #[test]
    fn test_short_document_is_rejected() {
        let html = wrap_body("<p>Too small to mean anything.</p>");
        let result = TextExtractor::new().extract_text(&html);
        assert!(matches!(
            result,
            Err(ExtractError::InsufficientContent { .. })
        ));
    }

    #[test]
    fn test_normalize_drops_noise_lines() {
        let raw = "Revenue increased\n\n\n\n$\n1\nby ten percent  overall";
        let normalized = normalize_text(raw);
        assert_eq!(normalized, "Revenue increased\n\nby ten percent overall");
    }
}
