//! Structural boilerplate-removal extraction.
//!
//! Picks the element most likely to hold the article body, walks it while
//! skipping navigation, comments and other page furniture, and renders what
//! remains as lightweight markdown (headings, paragraphs, lists, quotes,
//! tables and preformatted blocks).

use scraper::{ElementRef, Html, Selector};

use super::{collapse_whitespace, filtered_text, is_excluded, link_density, walk, Step};

/// Candidate article roots, most specific first
const ROOT_SELECTORS: &[&str] = &[
    "[itemprop='articleBody']",
    "article",
    "main",
    "[role='main']",
    ".article-body, .article-content, .story-body, .post-content, .entry-content, #article-body, #story",
];

/// A root needs at least this much text to be preferred over `<body>`
const MIN_ROOT_CHARS: usize = 200;

/// Lists that are mostly links are navigation, not content
const MAX_LIST_LINK_DENSITY: f64 = 0.7;

/// Extract article text as markdown. Returns an empty string when nothing survives.
pub fn extract(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let Some(root) = find_root(&document) else {
        return String::new();
    };

    let mut writer = MarkdownWriter::default();
    writer.render(root);
    writer.finish()
}

fn find_root(document: &Html) -> Option<ElementRef<'_>> {
    for raw in ROOT_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };

        // Largest match wins; ties keep document order
        let mut best: Option<(ElementRef<'_>, usize)> = None;
        for candidate in document.select(&selector) {
            if is_excluded(&candidate) {
                continue;
            }
            let len = filtered_text(candidate).chars().count();
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((candidate, len));
            }
        }

        if let Some((element, len)) = best {
            if len >= MIN_ROOT_CHARS {
                return Some(element);
            }
        }
    }

    let body = Selector::parse("body").ok()?;
    document
        .select(&body)
        .next()
        .or_else(|| Some(document.root_element()))
}

#[derive(Default)]
struct MarkdownWriter {
    blocks: Vec<String>,
    inline: String,
}

impl MarkdownWriter {
    fn render(&mut self, root: ElementRef<'_>) {
        walk(root, |step| match step {
            Step::Text(text) => {
                self.inline.push_str(text);
                true
            }
            Step::Enter(element) => self.enter(element),
            Step::Leave(element) => {
                if is_block_container(element.value().name()) {
                    self.flush();
                }
                true
            }
        });
    }

    /// Handle an opening element; returns whether to descend into it
    fn enter(&mut self, element: ElementRef<'_>) -> bool {
        if is_excluded(&element) {
            return false;
        }

        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                let level = name[1..].parse::<usize>().unwrap_or(1);
                let text = collapse_whitespace(&filtered_text(element));
                if !text.is_empty() {
                    self.blocks.push(format!("{} {}", "#".repeat(level), text));
                }
                false
            }
            "li" => {
                self.flush();
                let text = collapse_whitespace(&filtered_text(element));
                if !text.is_empty() {
                    self.blocks.push(format!("- {}", text));
                }
                false
            }
            "blockquote" => {
                self.flush();
                let text = collapse_whitespace(&filtered_text(element));
                if !text.is_empty() {
                    self.blocks.push(format!("> {}", text));
                }
                false
            }
            "pre" => {
                self.flush();
                let text = filtered_text(element);
                let text = text.trim_matches('\n');
                if !text.trim().is_empty() {
                    self.blocks.push(format!("```\n{}\n```", text));
                }
                false
            }
            "table" => {
                self.flush();
                if let Some(table) = render_table(element) {
                    self.blocks.push(table);
                }
                false
            }
            "ul" | "ol" => {
                self.flush();
                link_density(element) <= MAX_LIST_LINK_DENSITY
            }
            "br" => {
                self.inline.push(' ');
                false
            }
            "hr" => {
                self.flush();
                false
            }
            _ => {
                if is_block_container(name) {
                    self.flush();
                }
                true
            }
        }
    }

    fn flush(&mut self) {
        let text = collapse_whitespace(&self.inline);
        self.inline.clear();
        if !text.is_empty() {
            self.blocks.push(text);
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.blocks.dedup();
        self.blocks.join("\n\n")
    }
}

/// Elements whose content forms its own paragraph
fn is_block_container(name: &str) -> bool {
    matches!(
        name,
        "ul" | "ol"
            | "p"
            | "div"
            | "section"
            | "article"
            | "main"
            | "figure"
            | "figcaption"
            | "dl"
            | "dt"
            | "dd"
            | "address"
            | "details"
            | "summary"
            | "center"
    )
}

fn render_table(table: ElementRef<'_>) -> Option<String> {
    let rows = Selector::parse("tr").ok()?;
    let cells = Selector::parse("th, td").ok()?;
    let header_cells = Selector::parse("th").ok()?;

    let mut lines = Vec::new();
    for (index, row) in table.select(&rows).enumerate() {
        let values: Vec<String> = row
            .select(&cells)
            .map(|cell| collapse_whitespace(&filtered_text(cell)).replace('|', "\\|"))
            .collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }

        lines.push(format!("| {} |", values.join(" | ")));
        if index == 0 && row.select(&header_cells).next().is_some() {
            lines.push(format!("|{}", " --- |".repeat(values.len())));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html>
          <head><title>Budget vote</title><style>p { color: red; }</style></head>
          <body>
            <nav><a href="/">Home</a> <a href="/news">News</a></nav>
            <article>
              <h1>Council passes transit budget</h1>
              <p>The city council approved the new transit budget on Tuesday
                 after a <em>long</em> debate about bus routes.</p>
              <p>Supporters said the plan would add late-night service to
                 every neighborhood by next summer.</p>
              <ul><li>Ten new bus lines</li><li>Two rail stations</li></ul>
              <table>
                <tr><th>Item</th><th>Cost</th></tr>
                <tr><td>Buses</td><td>$12M</td></tr>
              </table>
              <div class="comments"><p>First! Great article.</p></div>
              <script>trackPageView();</script>
            </article>
            <footer>Copyright 2024</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extracts_article_as_markdown() {
        let text = extract(ARTICLE);

        assert!(text.starts_with("# Council passes transit budget"));
        assert!(text.contains("after a long debate about bus routes."));
        assert!(text.contains("- Ten new bus lines"));
        assert!(text.contains("| Item | Cost |"));
        assert!(text.contains("| --- | --- |"));
        assert!(text.contains("| Buses | $12M |"));
    }

    #[test]
    fn test_excludes_boilerplate_and_comments() {
        let text = extract(ARTICLE);

        assert!(!text.contains("Home"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("First! Great article."));
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_falls_back_to_body_without_article_root() {
        let html = "<html><body><div><p>Plain page paragraph one.</p><p>Paragraph two.</p></div></body></html>";
        let text = extract(html);
        assert_eq!(text, "Plain page paragraph one.\n\nParagraph two.");
    }

    #[test]
    fn test_navigation_lists_are_dropped() {
        let html = r#"<body><ul><li><a href="/a">Sports</a></li><li><a href="/b">Weather</a></li></ul>
            <p>Actual story text lives here.</p></body>"#;
        let text = extract(html);
        assert!(!text.contains("Sports"));
        assert!(text.contains("Actual story text lives here."));
    }

    #[test]
    fn test_deep_nesting_keeps_paragraphs() {
        let html = format!(
            "<body>{}<p>Inner paragraph.</p><p>Second one.</p>{}</body>",
            "<section>".repeat(5_000),
            "</section>".repeat(5_000)
        );
        assert_eq!(extract(&html), "Inner paragraph.\n\nSecond one.");
    }

    #[test]
    fn test_empty_markup() {
        assert_eq!(extract(""), "");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        assert_eq!(extract(ARTICLE), extract(ARTICLE));
    }
}
