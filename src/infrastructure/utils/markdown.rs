use std::collections::HashSet;

use ammonia::{Builder, UrlRelative};
use html_escape::decode_html_entities;
use pulldown_cmark::{html, Options, Parser};

/// Renders Markdown to HTML and sanitizes the result.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}

/// Keeps ammonia's default safe tag set; relative links pass through unchanged.
pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::PassThrough)
        .clean(content)
        .to_string()
}

/// Removes every tag and returns plain text. Script and style bodies are
/// dropped with their tags; entities escaped by the sanitizer are decoded again.
pub fn strip_html(content: &str) -> String {
    let cleaned = Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(content)
        .to_string();

    decode_html_entities(&cleaned).into_owned()
}
