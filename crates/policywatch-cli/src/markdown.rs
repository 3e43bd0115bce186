//! Markdown summaries to HTML for the static page.
//!
//! Raw HTML in a summary is shown as text, never passed through, and
//! script-capable link targets are replaced with `#`.

use policywatch_core::text::clean_summary;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Clean generated filler from `markdown` and render it.
pub fn summary_html(markdown: &str) -> String {
    let cleaned = clean_summary(markdown);
    let events = Parser::new_ext(&cleaned, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if is_unsafe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(cleaned.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn is_unsafe_url(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    UNSAFE_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_lists_and_bold() {
        let html = summary_html("## Key changes\n\n- **Age** limit raised\n- Appeals *extended*");
        assert!(html.contains("<h2>Key changes</h2>"));
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li><strong>Age</strong> limit raised</li>"));
        assert!(html.contains("<li>Appeals <em>extended</em></li>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = summary_html("- New <script>alert(1)</script> rule\n\n<div onclick=\"x()\">hi</div>");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<div onclick"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;div"));
    }

    #[test]
    fn script_links_are_neutralised() {
        let html = summary_html("[click](javascript:alert(1)) and [policy](https://example.com/p)");
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"<a href="https://example.com/p">policy</a>"#));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn generated_filler_is_dropped() {
        let html = summary_html(
            "Here's a concise summary of the update for a product manager:\n\n---\n\n**Scams** now banned.",
        );
        assert!(!html.contains("concise summary"));
        assert!(!html.contains("<hr"));
        assert_eq!(html.trim(), "<p><strong>Scams</strong> now banned.</p>");
    }
}
