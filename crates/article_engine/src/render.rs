//! Markdown rendering of an extracted [`Article`].
//!
//! Output is kept as lines until the end so images can be dropped after
//! resolution without rewriting text.

use std::collections::BTreeMap;

use article_core::{
    Article, Block, ImageMode, ImageReference, ImageRegistry, InlineSpan, MAX_HEADING_LEVEL,
};

use crate::code::{inline_code_span, CodeBlockFormatter};
use crate::header::{document_header, DocumentMeta};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Text(String),
    Image { index: usize, alt: String, indent: usize },
    /// Blank line between top-level constructs.
    Break,
}

/// Markdown with image placeholders plus the images it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    lines: Vec<Line>,
    registry: ImageRegistry,
}

impl RenderedDocument {
    /// Markdown using the `img_NNN.ext` placeholder names.
    pub fn markdown(&self) -> String {
        self.assemble(|reference| Some(reference.placeholder_name()))
    }

    /// Images in sequence-index order.
    pub fn images(&self) -> &[ImageReference] {
        self.registry.references()
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    /// Markdown with `resolved` local names; images missing from the map are dropped.
    pub fn finalize(&self, resolved: &BTreeMap<usize, String>) -> String {
        self.assemble(|reference| resolved.get(&reference.sequence_index).cloned())
    }

    fn assemble(&self, name_for: impl Fn(&ImageReference) -> Option<String>) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len());
        let mut pending_break = false;
        for line in &self.lines {
            let text = match line {
                Line::Break => {
                    pending_break = !out.is_empty();
                    continue;
                }
                Line::Text(text) => text.clone(),
                Line::Image { index, alt, indent } => {
                    let Some(name) = self.registry.get(*index).and_then(&name_for) else {
                        continue;
                    };
                    format!("{}![{}]({})", " ".repeat(*indent), escape_text(alt), escape_href(&name))
                }
            };
            if pending_break {
                out.push(String::new());
                pending_break = false;
            }
            out.push(text);
        }
        let mut document = out.join("\n");
        document.push('\n');
        document
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    image_mode: ImageMode,
    code: CodeBlockFormatter,
}

impl MarkdownRenderer {
    pub fn new(image_mode: ImageMode) -> Self {
        Self {
            image_mode,
            code: CodeBlockFormatter,
        }
    }

    pub fn image_mode(&self) -> ImageMode {
        self.image_mode
    }

    pub fn render(&self, article: &Article, meta: &DocumentMeta) -> RenderedDocument {
        let mut pass = RenderPass {
            renderer: self,
            lines: document_header(article, meta)
                .lines()
                .map(|line| Line::Text(line.to_string()))
                .collect(),
            registry: ImageRegistry::new(),
        };
        for block in &article.blocks {
            pass.lines.push(Line::Break);
            pass.push_block(block, 0);
        }
        RenderedDocument {
            lines: pass.lines,
            registry: pass.registry,
        }
    }
}

struct RenderPass<'r> {
    renderer: &'r MarkdownRenderer,
    lines: Vec<Line>,
    registry: ImageRegistry,
}

impl RenderPass<'_> {
    fn push_text(&mut self, indent: usize, text: &str) {
        self.lines
            .push(Line::Text(format!("{}{}", " ".repeat(indent), text).trim_end().to_string()));
    }

    fn push_block(&mut self, block: &Block, indent: usize) {
        match block {
            Block::Heading { level, text } => {
                let level = (*level).clamp(1, MAX_HEADING_LEVEL) as usize;
                self.push_text(indent, &format!("{} {}", "#".repeat(level), escape_text(text)));
            }
            Block::Paragraph(spans) => self.push_text(indent, &render_inline(spans)),
            Block::CodeBlock(code) => {
                let fenced = self.renderer.code.render(code);
                let pad = " ".repeat(indent);
                for line in fenced.split('\n') {
                    let line = if line.is_empty() {
                        String::new()
                    } else {
                        format!("{pad}{line}")
                    };
                    self.lines.push(Line::Text(line));
                }
            }
            Block::Image { src, alt } => {
                if self.renderer.image_mode == ImageMode::Embed {
                    let index = self.registry.register(src);
                    self.lines.push(Line::Image {
                        index,
                        alt: alt.clone(),
                        indent,
                    });
                }
            }
            Block::List { ordered, items } => self.push_list(*ordered, items, indent),
            Block::Link { text, href } => self.push_text(
                indent,
                &escape_line_start(format!("[{}]({})", escape_text(text), escape_href(href))),
            ),
            Block::Blockquote(spans) => {
                let body = render_inline(spans);
                for line in body.split('\n').map(str::trim) {
                    if line.is_empty() {
                        self.push_text(indent, ">");
                    } else {
                        self.push_text(indent, &format!("> {}", escape_line_start(line.to_string())));
                    }
                }
            }
        }
    }

    /// A paragraph opens a new entry; anything else continues the previous one.
    fn push_list(&mut self, ordered: bool, items: &[Block], indent: usize) {
        let mut number = 0usize;
        let mut child_indent = indent;
        for item in items {
            match item {
                Block::Paragraph(spans) => {
                    number += 1;
                    let marker = if ordered {
                        format!("{number}. ")
                    } else {
                        "- ".to_string()
                    };
                    child_indent = indent + marker.len();
                    self.push_text(indent, &format!("{marker}{}", render_inline(spans)));
                }
                other => self.push_block(other, child_indent),
            }
        }
    }
}

fn render_inline(spans: &[InlineSpan]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            InlineSpan::Text(text) => out.push_str(&escape_text(text)),
            InlineSpan::Bold(text) => {
                out.push_str("**");
                out.push_str(&escape_text(text));
                out.push_str("**");
            }
            InlineSpan::Italic(text) => {
                out.push('*');
                out.push_str(&escape_text(text));
                out.push('*');
            }
            InlineSpan::Code(text) => out.push_str(&inline_code_span(text)),
            InlineSpan::Link { text, href } => {
                out.push('[');
                out.push_str(&escape_text(text));
                out.push_str("](");
                out.push_str(&escape_href(href));
                out.push(')');
            }
        }
    }
    escape_line_start(out)
}

/// Backslash-escapes characters that would otherwise start Markdown syntax or
/// inline HTML.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        let escape = match c {
            '\\' | '*' | '_' | '[' | ']' | '`' | '<' => true,
            '&' => looks_like_entity(&text[i + 1..]),
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `rest` follows an `&`; true for `amp;`, `#38;` and the like.
fn looks_like_entity(rest: &str) -> bool {
    let name = rest.strip_prefix('#').unwrap_or(rest);
    let len = name
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(name.len());
    len > 0 && name[len..].starts_with(';')
}

pub(crate) fn escape_href(href: &str) -> String {
    href.replace(' ', "%20")
        .replace('(', "%28")
        .replace(')', "%29")
}

/// A line starting with a block marker would become a heading, quote, list,
/// setext underline or fence.
fn escape_line_start(line: String) -> String {
    if line.starts_with(['#', '>', '-', '+', '=', '~']) {
        return format!("\\{line}");
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if (1..=9).contains(&digits) && line[digits..].starts_with(['.', ')']) {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{escape_line_start, escape_text, render_inline};
    use article_core::InlineSpan;

    #[test]
    fn markdown_punctuation_is_escaped() {
        assert_eq!(escape_text(r"a*b_c[d]`e\"), r"a\*b\_c\[d\]\`e\\");
        assert_eq!(escape_text("plain text."), "plain text.");
    }

    #[test]
    fn leading_heading_and_quote_markers_are_escaped() {
        assert_eq!(escape_line_start("#1 pick".to_string()), r"\#1 pick");
        assert_eq!(escape_line_start("> not a quote".to_string()), r"\> not a quote");
        assert_eq!(escape_line_start("a # b".to_string()), "a # b");
    }

    #[test]
    fn angle_brackets_and_entity_lookalikes_are_escaped() {
        assert_eq!(escape_text("Use <div> tags"), r"Use \<div> tags");
        assert_eq!(escape_text("&amp; and &#38; but AT&T & co"), r"\&amp; and \&#38; but AT&T & co");
    }

    #[test]
    fn list_setext_and_fence_markers_are_escaped() {
        assert_eq!(escape_line_start("- dash text".to_string()), r"\- dash text");
        assert_eq!(escape_line_start("+ plus".to_string()), r"\+ plus");
        assert_eq!(escape_line_start("===".to_string()), r"\===");
        assert_eq!(escape_line_start("~~~".to_string()), r"\~~~");
        assert_eq!(escape_line_start("1. Not a list".to_string()), r"1\. Not a list");
        assert_eq!(escape_line_start("2024) was".to_string()), r"2024\) was");
        assert_eq!(escape_line_start("1234567890. long".to_string()), "1234567890. long");
        assert_eq!(escape_line_start("3 apples".to_string()), "3 apples");
    }

    #[test]
    fn inline_spans_render_in_order() {
        let spans = vec![
            InlineSpan::Text("Use ".to_string()),
            InlineSpan::Code("cargo".to_string()),
            InlineSpan::Text(" with ".to_string()),
            InlineSpan::Bold("care".to_string()),
            InlineSpan::Text(", see ".to_string()),
            InlineSpan::Link {
                text: "docs".to_string(),
                href: "https://d.example/a b".to_string(),
            },
            InlineSpan::Italic("now".to_string()),
        ];
        assert_eq!(
            render_inline(&spans),
            "Use `cargo` with **care**, see [docs](https://d.example/a%20b)*now*"
        );
    }
}
