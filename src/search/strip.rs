//! Markdown to plain text

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::content::markdown::parser_options;

/// Plain text of a Markdown/JSX body, on one line
///
/// Images disappear with their alt text, links keep only their text, and
/// heading, emphasis and code markers are removed while the text they wrap
/// stays. Fenced code keeps its contents. Raw HTML/JSX tags are dropped but
/// text between them is kept. Every line break becomes one space.
pub fn strip_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut image_depth = 0usize;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            _ if image_depth > 0 => {}

            Event::Text(text)
            | Event::Code(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text) => push_text(&mut out, &text),
            Event::Html(html) | Event::InlineHtml(html) => push_text(&mut out, &strip_tags(&html)),

            Event::SoftBreak | Event::HardBreak | Event::Rule => push_space(&mut out),
            Event::End(end) if ends_block(&end) => push_space(&mut out),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn ends_block(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::TableCell
            | TagEnd::FootnoteDefinition
    )
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            push_space(out);
        } else {
            out.push(c);
        }
    }
}

fn push_space(out: &mut String) {
    if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
}

/// Remove `<...>` tags, keeping the text between them
fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}
