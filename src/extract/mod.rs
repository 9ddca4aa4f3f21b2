//! Turning fetched markup into clean article text.
//!
//! - [`ContentExtractor`]: structural extraction with a readability-style fallback,
//!   both behind the same minimum-viable-content gate
//! - [`BlockDetector`]: classifies extracted text as real content or a challenge page
//!
//! # Example
//!
//! ```rust
//! use article_scout::extract::{BlockDetector, ContentExtractor, PhraseBlockDetector};
//!
//! let html = format!("<article><p>{}</p></article>", "Real reporting. ".repeat(20));
//! let extractor = ContentExtractor::new();
//! let detector = PhraseBlockDetector::new();
//!
//! let text = extractor.extract_accepted(&html, &detector).unwrap();
//! assert!(!detector.is_blocked(&text));
//! ```

pub mod block;
pub mod readability;
pub mod structural;

pub use block::{BlockDetector, PhraseBlockDetector};

use scraper::{ElementRef, Node};

use crate::models::MIN_CONTENT_CHARS;

/// Tags whose content is never article text
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "button", "template", "select", "textarea", "input", "head", "canvas", "object", "embed",
];

/// class/id tokens that mark page furniture
const BOILERPLATE_TOKENS: &[&str] = &[
    "ad", "ads", "advert", "advertisement", "breadcrumb", "breadcrumbs", "comment", "comments",
    "consent", "cookie", "cookies", "disqus", "footer", "masthead", "menu", "modal", "nav",
    "navbar", "newsletter", "outbrain", "popup", "promo", "recommended", "related", "share",
    "sharing", "sidebar", "social", "sponsor", "sponsored", "subscribe", "subscription",
    "taboola",
];

/// ARIA roles that mark page furniture
const BOILERPLATE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
    "dialog",
];

/// Extracts article prose from raw markup
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    min_chars: usize,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self {
            min_chars: MIN_CONTENT_CHARS,
        }
    }

    /// Override the minimum-viable-content threshold (characters)
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Whether `text` is long enough to count as content
    pub fn meets_minimum(&self, text: &str) -> bool {
        text.chars().count() > self.min_chars
    }

    /// Extract article text, or `None` when neither algorithm produces enough of it
    pub fn extract(&self, markup: &str) -> Option<String> {
        self.extract_where(markup, |_| true)
    }

    /// Extract article text that also passes block detection.
    ///
    /// A primary result that looks like a challenge page falls through to the
    /// fallback algorithm before giving up.
    pub fn extract_accepted(&self, markup: &str, detector: &dyn BlockDetector) -> Option<String> {
        self.extract_where(markup, |text| !detector.is_blocked(text))
    }

    fn extract_where<F>(&self, markup: &str, accept: F) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        if markup.trim().is_empty() {
            return None;
        }

        let primary = structural::extract(markup);
        if self.meets_minimum(&primary) && accept(&primary) {
            return Some(primary);
        }

        let fallback = readability::extract(markup);
        if self.meets_minimum(&fallback) && accept(&fallback) {
            return Some(fallback);
        }

        None
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_noise_tag(name: &str) -> bool {
    NOISE_TAGS.contains(&name)
}

/// Whether an element (and everything under it) should be skipped
pub(crate) fn is_excluded(element: &ElementRef<'_>) -> bool {
    let el = element.value();
    if is_noise_tag(el.name()) {
        return true;
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    if let Some(role) = el.attr("role") {
        if BOILERPLATE_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    [el.attr("class"), el.attr("id")]
        .into_iter()
        .flatten()
        .flat_map(|value| value.split(|c: char| c.is_whitespace() || c == '-' || c == '_'))
        .any(|token| {
            !token.is_empty() && BOILERPLATE_TOKENS.contains(&token.to_ascii_lowercase().as_str())
        })
}

/// Text under `element`, skipping excluded subtrees
pub(crate) fn filtered_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    let spaced = |name: &str| {
        matches!(
            name,
            "br" | "p" | "div" | "li" | "td" | "th" | "tr" | "dd" | "dt"
        )
    };

    walk(element, |step| match step {
        Step::Text(text) => {
            out.push_str(text);
            true
        }
        Step::Enter(child) => {
            if is_excluded(&child) {
                return false;
            }
            if spaced(child.value().name()) {
                out.push(' ');
            }
            true
        }
        Step::Leave(child) => {
            if spaced(child.value().name()) {
                out.push(' ');
            }
            true
        }
    });
}

/// One event of a depth-first walk
pub(crate) enum Step<'a> {
    Enter(ElementRef<'a>),
    Text(&'a str),
    Leave(ElementRef<'a>),
}

/// Depth-first walk over everything below `root`, in document order.
///
/// Uses a heap-allocated stack, so nesting depth is bounded by memory rather
/// than by the thread's stack. Returning `false` from an `Enter` skips that
/// element's subtree and its `Leave`.
pub(crate) fn walk<'a, F>(root: ElementRef<'a>, mut on_step: F)
where
    F: FnMut(Step<'a>) -> bool,
{
    let mut stack = Vec::new();
    push_children(root, &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(element) => {
                if on_step(Step::Enter(element)) {
                    stack.push(Step::Leave(element));
                    push_children(element, &mut stack);
                }
            }
            other => {
                on_step(other);
            }
        }
    }
}

fn push_children<'a>(element: ElementRef<'a>, stack: &mut Vec<Step<'a>>) {
    let start = stack.len();
    for child in element.children() {
        match child.value() {
            Node::Text(text) => stack.push(Step::Text(&**text)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    stack.push(Step::Enter(child));
                }
            }
            _ => {}
        }
    }
    // Popped last-in first-out, so store in reverse document order
    stack[start..].reverse();
}

/// Share of visible characters that sit inside links
pub(crate) fn link_density(element: ElementRef<'_>) -> f64 {
    let visible = |s: &str| s.chars().filter(|c| !c.is_whitespace()).count();

    let total: usize = element.text().map(visible).sum();
    if total == 0 {
        return 0.0;
    }

    let linked: usize = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .map(|a| a.text().map(visible).sum::<usize>())
        .sum();

    (linked as f64 / total as f64).min(1.0)
}

/// Collapse all whitespace runs to single spaces and trim
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
