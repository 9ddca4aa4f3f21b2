//! Readability-style fallback extraction.
//!
//! Paragraphs vote for their parent (full score) and grandparent (half score);
//! the container with the best link-adjusted score is taken as the content
//! block and flattened to plain text.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{is_excluded, is_noise_tag, link_density, walk, Step};

/// Paragraphs shorter than this do not vote
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Elements that end a line when flattening to text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

/// Extract the largest content block as plain text. Returns an empty string when
/// the page has no scoring paragraphs and no body.
pub fn extract(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let Some(block) = best_block(&document) else {
        return String::new();
    };

    let mut raw = String::new();
    flatten(block, &mut raw);
    normalize(&raw).unwrap_or_default()
}

fn best_block(document: &Html) -> Option<ElementRef<'_>> {
    let paragraphs = Selector::parse("p, pre, td, blockquote").ok()?;

    // Insertion-ordered scores keep tie-breaking deterministic
    let mut order = Vec::new();
    let mut index = HashMap::new();

    for paragraph in document.select(&paragraphs) {
        if has_excluded_ancestor(paragraph) {
            continue;
        }
        let text: String = paragraph.text().collect();
        let len = text.trim().chars().count();
        if len < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let score = 1.0 + commas + (len as f64 / 100.0).min(3.0);

        let Some(parent) = paragraph.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        add_score(&mut order, &mut index, parent.id(), score);
        if let Some(grandparent) = parent.parent().and_then(ElementRef::wrap) {
            add_score(&mut order, &mut index, grandparent.id(), score / 2.0);
        }
    }

    let mut best: Option<(ElementRef<'_>, f64)> = None;
    for (id, score) in order {
        let Some(element) = document.tree.get(id).and_then(ElementRef::wrap) else {
            continue;
        };
        let adjusted = score * (1.0 - link_density(element));
        if best.map_or(true, |(_, best_score)| adjusted > best_score) {
            best = Some((element, adjusted));
        }
    }

    if let Some((element, _)) = best {
        return Some(element);
    }

    let body = Selector::parse("body").ok()?;
    document.select(&body).next()
}

fn add_score<K: Copy + Eq + Hash>(
    order: &mut Vec<(K, f64)>,
    index: &mut HashMap<K, usize>,
    id: K,
    score: f64,
) {
    if let Some(&i) = index.get(&id) {
        order[i].1 += score;
        return;
    }
    index.insert(id, order.len());
    order.push((id, score));
}

fn has_excluded_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_excluded(&ancestor))
}

fn flatten(element: ElementRef<'_>, out: &mut String) {
    let is_block = |el: &ElementRef<'_>| BLOCK_TAGS.contains(&el.value().name());

    walk(element, |step| match step {
        Step::Text(text) => {
            out.push_str(text);
            true
        }
        Step::Enter(child) => {
            if is_noise_tag(child.value().name()) {
                return false;
            }
            if is_block(&child) {
                out.push('\n');
            }
            true
        }
        Step::Leave(child) => {
            if is_block(&child) {
                out.push('\n');
            }
            true
        }
    });
}

fn inline_spaces() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"[^\S\n]+").ok())
        .as_ref()
}

fn blank_line_runs() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\n\s*\n").ok())
        .as_ref()
}

/// Collapse spaces within lines and runs of blank lines to a single blank line
fn normalize(raw: &str) -> Option<String> {
    let spaces = inline_spaces()?;
    let blank_runs = blank_line_runs()?;

    let lines: Vec<String> = raw
        .lines()
        .map(|line| spaces.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");

    Some(blank_runs.replace_all(&joined, "\n\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_densest_block() {
        let html = r#"
            <html><body>
              <div id="menu"><a href="/">Home</a> <a href="/about">About</a></div>
              <div id="story">
                <p>The harbor reopened on Monday, after two weeks of repairs, officials said.</p>
                <p>Fishing crews, ferry operators, and dock workers returned early in the morning.</p>
              </div>
              <div id="promo-box"><p>Subscribe for more, today, now, please, thanks.</p></div>
            </body></html>
        "#;
        let text = extract(html);
        assert!(text.starts_with("The harbor reopened on Monday"));
        assert!(text.contains("\n\nFishing crews"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Subscribe"));
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<body><div><p>First   line   of    text that is long enough.</p>\n\n\n<p>Second paragraph, also long enough.</p></div></body>";
        let text = extract(html);
        assert_eq!(
            text,
            "First line of text that is long enough.\n\nSecond paragraph, also long enough."
        );
    }

    #[test]
    fn test_without_paragraphs_uses_body() {
        let text = extract("<body><span>Just a bare line of text</span></body>");
        assert_eq!(text, "Just a bare line of text");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  a  b \n\n\n\n c ").unwrap(), "a b\n\nc");
        assert_eq!(normalize("x\t\ty").unwrap(), "x y");
    }

    #[test]
    fn test_flatten_skips_noise() {
        let html = Html::parse_fragment("<div id=\"x\">one<script>var a;</script><p>two</p>three</div>");
        let selector = Selector::parse("#x").unwrap();
        let mut raw = String::new();
        flatten(html.select(&selector).next().unwrap(), &mut raw);
        assert_eq!(raw, "one\ntwo\nthree");
    }
}
