//! Markdown rendering for assistant replies.
//!
//! GitHub-flavoured extensions are on. Raw HTML in a reply is escaped rather
//! than injected, and links open in a new tab without leaking the opener.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Replies larger than this are shown as plain text.
pub const MARKDOWN_FALLBACK_THRESHOLD_BYTES: usize = 128 * 1024;

/// Renders `content` to an HTML fragment, or `None` when it is too large to
/// render and should be shown as plain text instead.
pub fn render_markdown(content: &str) -> Option<String> {
    if content.len() > MARKDOWN_FALLBACK_THRESHOLD_BYTES {
        return None;
    }

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let events = Parser::new_ext(content, options).map(|event| match event {
        Event::Start(Tag::Link { dest_url, title, .. }) => Event::Html(open_link(&dest_url, &title)),
        Event::End(TagEnd::Link) => Event::Html(CowStr::Borrowed("</a>")),
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, events);
    Some(out)
}

fn open_link(dest_url: &str, title: &str) -> CowStr<'static> {
    let href = if is_script_url(dest_url) { "#" } else { dest_url };
    let mut tag = format!(r#"<a href="{}""#, escape_attr(href));
    if !title.is_empty() {
        tag.push_str(&format!(r#" title="{}""#, escape_attr(title)));
    }
    tag.push_str(r#" target="_blank" rel="noopener noreferrer">"#);
    CowStr::from(tag)
}

fn is_script_url(url: &str) -> bool {
    let scheme = url.trim_start().to_ascii_lowercase();
    scheme.starts_with("javascript:") || scheme.starts_with("vbscript:") || scheme.starts_with("data:")
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            c => escaped.push(c),
        }
    }
    escaped
}
