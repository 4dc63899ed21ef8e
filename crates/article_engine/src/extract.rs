use article_core::{Article, Block, CodeBlock, InlineSpan};
use ego_tree::{NodeId, NodeRef};
use export_logging::{export_debug, export_warn};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::code::{CodeBlockFormatter, FormattingWarning};
use crate::denylist::{DenyAction, Denylist};

const CANDIDATE_SELECTOR: &str = "body, article, main, section, div, td";
/// Whole-article containers preferred over any single section inside them.
const CONTAINER_SELECTOR: &str = r#"article, main, [role="main"], .article-content, .post-content, .entry-content, .article-body, .post-body, .entry-body"#;
const TITLE_CLASS_SELECTOR: &str = ".article-title, .post-title, .entry-title";
const TITLE_META_SELECTORS: &[&str] = &[
    r#"meta[property="og:title"]"#,
    r#"meta[name="twitter:title"]"#,
];
const AUTHOR_SELECTORS: &[&str] = &[
    ".post-author-name",
    ".author-name",
    ".byline",
    ".author",
    ".post-author",
    ".entry-author",
    r#"[rel="author"]"#,
    r#"[itemprop="author"]"#,
    r#"meta[name="author"]"#,
    r#"[class*="author"]"#,
    r#"[class*="byline"]"#,
];
const PUBLISHED_SELECTORS: &[(&str, &str)] = &[
    (r#"meta[property="article:published_time"]"#, "content"),
    (r#"meta[itemprop="datePublished"]"#, "content"),
    (r#"meta[name="date"]"#, "content"),
    ("time[datetime]", "datetime"),
];
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "font", "i",
    "img", "ins", "kbd", "label", "mark", "picture", "q", "s", "samp", "small", "span", "strike",
    "strong", "sub", "sup", "time", "tt", "u", "var", "wbr",
];
/// Elements that start a new line inside a blockquote.
const BREAKING_TAGS: &[&str] = &[
    "p", "div", "section", "article", "ul", "ol", "li", "blockquote", "h1", "h2", "h3",
    "h4", "h5", "h6", "figure", "figcaption", "table", "tr",
];
const DEFAULT_ALT_TEXT: &str = "image";

/// Weights for picking the main content container.
///
/// `score = paragraph_weight * paragraphs - denylist_penalty * boilerplate_children`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub paragraph_weight: i32,
    pub denylist_penalty: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            paragraph_weight: 1,
            denylist_penalty: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub denylist: Denylist,
    pub scoring: ScoringPolicy,
    /// Images declaring a smaller width or height are treated as tracking pixels.
    pub min_image_dimension: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            denylist: Denylist::default(),
            scoring: ScoringPolicy::default(),
            min_image_dimension: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no title found in document")]
    NoTitle,
    #[error("no article content found in document")]
    NoContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub article: Article,
    pub warnings: Vec<FormattingWarning>,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, base_url: Option<&str>) -> Result<Extraction, ExtractionError>;
}

/// Readability-style extractor: scores candidate containers, then walks the
/// winner into [`Block`]s while skipping denylisted regions.
#[derive(Debug, Default, Clone)]
pub struct ContentExtractor {
    config: ExtractorConfig,
    formatter: CodeBlockFormatter,
}

impl ContentExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            formatter: CodeBlockFormatter,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn deny(&self, element: ElementRef) -> Option<DenyAction> {
        let value = element.value();
        self.config
            .denylist
            .classify(value.name(), value.classes(), value.id())
    }

    fn has_denied_ancestor(&self, element: ElementRef) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.deny(ancestor).is_some())
    }

    fn score(&self, candidate: ElementRef) -> i32 {
        let policy = self.config.scoring;
        candidate
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| {
                if self.deny(child) == Some(DenyAction::Boilerplate) {
                    return -policy.denylist_penalty;
                }
                match child.value().name() {
                    "p" if !collapse_whitespace(&child.text().collect::<String>()).is_empty() => {
                        policy.paragraph_weight
                    }
                    "pre" | "blockquote" => policy.paragraph_weight,
                    _ => 0,
                }
            })
            .sum()
    }

    /// Score of `element` plus every non-denylisted element below it.
    fn subtree_score(&self, element: ElementRef) -> i32 {
        self.score(element)
            + element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| self.deny(*child).is_none())
                .map(|child| self.subtree_score(child))
                .sum::<i32>()
    }

    /// Moves up while the parent holds more scoring content beside `region`,
    /// then to the nearest enclosing article container.
    fn widen<'a>(&self, mut region: ElementRef<'a>) -> ElementRef<'a> {
        while let Some(parent) = region.parent().and_then(ElementRef::wrap) {
            let tag = parent.value().name();
            if matches!(tag, "body" | "html") || self.deny(parent).is_some() {
                break;
            }
            let own = node_id(region);
            let beside: i32 = parent
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| node_id(*child) != own && self.deny(*child).is_none())
                .map(|child| self.subtree_score(child))
                .sum();
            if beside <= 0 {
                break;
            }
            region = parent;
        }

        let Some(containers) = selector(CONTAINER_SELECTOR) else {
            return region;
        };
        if containers.matches(&region) {
            return region;
        }
        region
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|ancestor| self.deny(*ancestor).is_none())
            .find(|ancestor| containers.matches(ancestor))
            .unwrap_or(region)
    }

    /// Highest scoring candidate, ties keeping the earliest in document order,
    /// widened to the article that contains it.
    fn select_region<'a>(&self, doc: &'a Html) -> ElementRef<'a> {
        let fallback = first_match(doc, "body").unwrap_or_else(|| doc.root_element());
        let Some(candidates) = selector(CANDIDATE_SELECTOR) else {
            return fallback;
        };

        let mut best: Option<(i32, ElementRef<'a>)> = None;
        for candidate in doc.select(&candidates) {
            if self.deny(candidate).is_some() || self.has_denied_ancestor(candidate) {
                continue;
            }
            let score = self.score(candidate);
            if score > best.map_or(0, |(top, _)| top) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, best)) => {
                let region = self.widen(best);
                export_debug!(
                    "content region <{}> selected with score {} (best candidate <{}>)",
                    region.value().name(),
                    score,
                    best.value().name()
                );
                region
            }
            None => fallback,
        }
    }
}

impl Extractor for ContentExtractor {
    fn extract(&self, html: &str, base_url: Option<&str>) -> Result<Extraction, ExtractionError> {
        let doc = Html::parse_document(html);
        let base_url = base_url.and_then(|b| Url::parse(b).ok());
        let region = self.select_region(&doc);
        let title = find_title(&doc, region);

        let mut walker = BlockWalker {
            extractor: self,
            base_url,
            skip: title.as_ref().and_then(|(_, node)| *node),
            warnings: Vec::new(),
        };
        let blocks = walker.blocks_of(region);
        if blocks.is_empty() {
            return Err(ExtractionError::NoContent);
        }
        let (title, _) = title.ok_or(ExtractionError::NoTitle)?;

        for warning in &walker.warnings {
            export_warn!("{}", warning);
        }

        Ok(Extraction {
            article: Article {
                title,
                author: find_author(&doc),
                published: find_published(&doc),
                blocks,
            },
            warnings: walker.warnings,
        })
    }
}

/// Title text and, when it came from a heading that will be walked, that node.
fn find_title(doc: &Html, region: ElementRef) -> Option<(String, Option<NodeId>)> {
    let from_region = selector("h1")
        .and_then(|sel| first_text(region.select(&sel)))
        .or_else(|| {
            selector(TITLE_CLASS_SELECTOR).and_then(|sel| first_text(doc.select(&sel)))
        });
    if let Some((text, node)) = from_region {
        return Some((text, Some(node)));
    }

    let from_meta = TITLE_META_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            doc.select(&sel)
                .filter_map(|el| el.value().attr("content"))
                .map(collapse_whitespace)
                .find(|text| !text.is_empty())
        })
        .or_else(|| selector("title").and_then(|sel| first_text(doc.select(&sel)).map(|(t, _)| t)));
    if let Some(text) = from_meta {
        return Some((text, None));
    }

    selector("h1, h2, h3, h4, h5, h6")
        .and_then(|sel| first_text(doc.select(&sel)))
        .map(|(text, node)| (text, Some(node)))
}

fn find_author(doc: &Html) -> Option<String> {
    AUTHOR_SELECTORS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            doc.select(&sel).find_map(|el| {
                let raw = match el.value().attr("content") {
                    Some(content) if el.value().name() == "meta" => content.to_string(),
                    _ => el.text().collect::<String>(),
                };
                clean_byline(&raw)
            })
        })
}

fn clean_byline(raw: &str) -> Option<String> {
    let text = collapse_whitespace(raw);
    let text = text.trim_start_matches(['-', '–', '—', ' ']);
    let text = match text.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("by ") => &text[3..],
        _ => text,
    };
    let text = text.trim_start_matches(['-', '–', '—', ' ']).trim();
    (text.chars().count() > 2).then(|| text.to_string())
}

fn find_published(doc: &Html) -> Option<String> {
    PUBLISHED_SELECTORS.iter().find_map(|(css, attr)| {
        let sel = selector(css)?;
        doc.select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
    })
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_match<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).next()
}

fn first_text<'a>(mut elements: impl Iterator<Item = ElementRef<'a>>) -> Option<(String, NodeId)> {
    elements.find_map(|el| {
        let text = collapse_whitespace(&el.text().collect::<String>());
        (!text.is_empty()).then(|| (text, node_id(el)))
    })
}

fn node_id(element: ElementRef) -> NodeId {
    let node: NodeRef<Node> = *element;
    node.id()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Resolve a reference against the page URL. Fragment-only, query-only and
/// `javascript:` references have no useful target.
fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}

/// Inline content waiting to become a paragraph, plus the blocks (images, and
/// code inside quotes) hoisted out of it.
#[derive(Debug, Default)]
struct InlineBuffer {
    spans: Vec<InlineSpan>,
    hoisted: Vec<Block>,
}

impl InlineBuffer {
    fn push_text(&mut self, raw: &str) {
        let mut text = String::with_capacity(raw.len());
        let mut in_space = false;
        for ch in raw.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    text.push(' ');
                }
                in_space = true;
            } else {
                text.push(ch);
                in_space = false;
            }
        }
        if text.is_empty() {
            return;
        }

        match self.spans.last_mut() {
            Some(InlineSpan::Text(prev)) => {
                if prev.ends_with([' ', '\n']) {
                    prev.push_str(text.trim_start_matches(' '));
                } else {
                    prev.push_str(&text);
                }
            }
            _ => self.spans.push(InlineSpan::Text(text)),
        }
    }

    /// Paragraph boundary inside a blockquote.
    fn push_break(&mut self) {
        if let Some(InlineSpan::Text(prev)) = self.spans.last_mut() {
            let trimmed_len = prev.trim_end_matches(' ').len();
            prev.truncate(trimmed_len);
            let missing = if prev.ends_with("\n\n") {
                ""
            } else if prev.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            prev.push_str(missing);
        } else if !self.spans.is_empty() {
            self.spans.push(InlineSpan::Text("\n\n".to_string()));
        }
    }

    fn push_span(&mut self, span: InlineSpan) {
        if !span.is_blank() {
            self.spans.push(span);
        }
    }

    /// Pushes `span` built from `raw`, keeping the whitespace that surrounded it.
    fn push_wrapped(&mut self, raw: &str, build: impl FnOnce(String) -> InlineSpan) {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return;
        }
        if raw.starts_with(char::is_whitespace) {
            self.push_text(" ");
        }
        self.push_span(build(text));
        if raw.ends_with(char::is_whitespace) {
            self.push_text(" ");
        }
    }

    fn finish(self) -> (Vec<InlineSpan>, Vec<Block>) {
        let mut spans = self.spans;
        if let Some(InlineSpan::Text(first)) = spans.first_mut() {
            *first = first.trim_start().to_string();
        }
        if let Some(InlineSpan::Text(last)) = spans.last_mut() {
            *last = last.trim_end().to_string();
        }
        spans.retain(|span| !matches!(span, InlineSpan::Text(text) if text.is_empty()));
        if is_bracket_debris(&spans) {
            spans.clear();
        }
        (spans, self.hoisted)
    }

    fn flush_into(&mut self, out: &mut Vec<Block>) {
        let (spans, images) = std::mem::take(self).finish();
        match spans.as_slice() {
            [] => {}
            [InlineSpan::Link { text, href }] => out.push(Block::Link {
                text: text.clone(),
                href: href.clone(),
            }),
            _ => out.push(Block::Paragraph(spans)),
        }
        out.extend(images);
    }
}

/// Leftover `[` / `]` characters from stripped widgets.
fn is_bracket_debris(spans: &[InlineSpan]) -> bool {
    !spans.is_empty()
        && spans.iter().all(|span| match span {
            InlineSpan::Text(text) => text.chars().all(|c| matches!(c, '[' | ']' | ' ')),
            _ => false,
        })
}

struct BlockWalker<'e> {
    extractor: &'e ContentExtractor,
    base_url: Option<Url>,
    skip: Option<NodeId>,
    warnings: Vec<FormattingWarning>,
}

impl BlockWalker<'_> {
    fn is_excluded(&self, element: ElementRef) -> bool {
        self.extractor.deny(element).is_some() || Some(node_id(element)) == self.skip
    }

    fn blocks_of(&mut self, container: ElementRef) -> Vec<Block> {
        let mut out = Vec::new();
        let mut inline = InlineBuffer::default();
        for child in container.children() {
            match child.value() {
                Node::Text(text) => inline.push_text(text),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.visit_block(element, &mut inline, &mut out);
                    }
                }
                _ => {}
            }
        }
        inline.flush_into(&mut out);
        out
    }

    fn visit_block(&mut self, element: ElementRef, inline: &mut InlineBuffer, out: &mut Vec<Block>) {
        if self.is_excluded(element) {
            return;
        }
        let tag = element.value().name().to_ascii_lowercase();
        if let Some(level) = heading_level(&tag) {
            inline.flush_into(out);
            let text = self.visible_text(element);
            if !text.is_empty() {
                out.push(Block::heading(level, text));
            }
            return;
        }

        match tag.as_str() {
            "p" => {
                inline.flush_into(out);
                let mut paragraph = InlineBuffer::default();
                self.collect_inline(element, &mut paragraph);
                paragraph.flush_into(out);
            }
            "ul" | "ol" => {
                inline.flush_into(out);
                out.extend(self.list_of(element, tag == "ol"));
            }
            "pre" => {
                inline.flush_into(out);
                out.extend(self.code_of(element).map(Block::CodeBlock));
            }
            "blockquote" => {
                inline.flush_into(out);
                let (spans, hoisted) = self.quote_of(element);
                if !spans.is_empty() {
                    out.push(Block::Blockquote(spans));
                }
                out.extend(hoisted);
            }
            "br" | "hr" => inline.flush_into(out),
            _ if INLINE_TAGS.contains(&tag.as_str()) => self.visit_inline(element, inline),
            _ => {
                inline.flush_into(out);
                let nested = self.blocks_of(element);
                out.extend(nested);
            }
        }
    }

    fn collect_inline(&mut self, element: ElementRef, buffer: &mut InlineBuffer) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => buffer.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        if !self.is_excluded(child) {
                            self.visit_inline(child, buffer);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_inline(&mut self, element: ElementRef, buffer: &mut InlineBuffer) {
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "strong" | "b" => {
                self.hoist_images(element, buffer);
                buffer.push_wrapped(&self.raw_visible_text(element), InlineSpan::Bold);
            }
            "em" | "i" => {
                self.hoist_images(element, buffer);
                buffer.push_wrapped(&self.raw_visible_text(element), InlineSpan::Italic);
            }
            "code" | "kbd" | "samp" | "tt" => {
                buffer.push_wrapped(&self.raw_visible_text(element), InlineSpan::Code);
            }
            "a" => self.link_into(element, buffer),
            "img" => buffer.hoisted.extend(self.image_of(element)),
            "br" => buffer.push_text(" "),
            _ => self.collect_inline(element, buffer),
        }
    }

    fn link_into(&mut self, element: ElementRef, buffer: &mut InlineBuffer) {
        self.hoist_images(element, buffer);
        let raw = self.raw_visible_text(element);
        let href = element
            .value()
            .attr("href")
            .and_then(|href| resolve_url(href, self.base_url.as_ref()));
        match href {
            Some(href) => buffer.push_wrapped(&raw, |text| InlineSpan::Link {
                text,
                href: href.into(),
            }),
            None => buffer.push_text(&raw),
        }
    }

    fn hoist_images(&mut self, element: ElementRef, buffer: &mut InlineBuffer) {
        let images: Vec<_> = element
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case("img"))
            .filter(|el| !self.is_excluded(*el))
            .filter_map(|el| self.image_of(el))
            .collect();
        buffer.hoisted.extend(images);
    }

    fn image_of(&self, element: ElementRef) -> Option<Block> {
        let value = element.value();
        let usable = |src: &&str| {
            let src = src.trim();
            !src.is_empty() && !src.to_ascii_lowercase().starts_with("data:")
        };
        let src = value
            .attr("src")
            .filter(usable)
            .or_else(|| value.attr("data-src").filter(usable))?;

        let min = self.extractor.config.min_image_dimension;
        let too_small = ["width", "height"].iter().any(|attr| {
            value
                .attr(attr)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<u32>().ok())
                .is_some_and(|size| size < min)
        });
        if too_small {
            return None;
        }

        let url = resolve_url(src, self.base_url.as_ref())?;
        let alt = value.attr("alt").map(collapse_whitespace).unwrap_or_default();
        Some(Block::Image {
            src: url.into(),
            alt: if alt.is_empty() {
                DEFAULT_ALT_TEXT.to_string()
            } else {
                alt
            },
        })
    }

    fn list_of(&mut self, list: ElementRef, ordered: bool) -> Option<Block> {
        let mut items = Vec::new();
        for child in list.children().filter_map(ElementRef::wrap) {
            if self.is_excluded(child) {
                continue;
            }
            match child.value().name() {
                "li" => self.list_item_into(child, &mut items),
                "ul" | "ol" => {
                    let nested_ordered = child.value().name() == "ol";
                    items.extend(self.list_of(child, nested_ordered));
                }
                _ => {}
            }
        }
        (!items.is_empty()).then_some(Block::List { ordered, items })
    }

    fn list_item_into(&mut self, item: ElementRef, items: &mut Vec<Block>) {
        let mut text = InlineBuffer::default();
        let mut nested = Vec::new();
        for child in item.children() {
            match child.value() {
                Node::Text(raw) => text.push_text(raw),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if self.is_excluded(child) {
                        continue;
                    }
                    let tag = child.value().name().to_ascii_lowercase();
                    match tag.as_str() {
                        "ul" | "ol" => nested.extend(self.list_of(child, tag == "ol")),
                        "pre" => nested.extend(self.code_of(child).map(Block::CodeBlock)),
                        _ if INLINE_TAGS.contains(&tag.as_str()) => {
                            self.visit_inline(child, &mut text)
                        }
                        _ => {
                            text.push_text(" ");
                            self.collect_inline(child, &mut text);
                            text.push_text(" ");
                        }
                    }
                }
                _ => {}
            }
        }

        let (spans, images) = text.finish();
        if spans.is_empty() && images.is_empty() && nested.is_empty() {
            return;
        }
        items.push(Block::Paragraph(spans));
        items.extend(images);
        items.extend(nested);
    }

    fn quote_of(&mut self, quote: ElementRef) -> (Vec<InlineSpan>, Vec<Block>) {
        let mut buffer = InlineBuffer::default();
        self.quote_into(quote, &mut buffer);
        buffer.finish()
    }

    fn quote_into(&mut self, element: ElementRef, buffer: &mut InlineBuffer) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => buffer.push_text(text),
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if self.is_excluded(child) {
                        continue;
                    }
                    let tag = child.value().name().to_ascii_lowercase();
                    if tag == "pre" {
                        buffer.hoisted.extend(self.code_of(child).map(Block::CodeBlock));
                    } else if BREAKING_TAGS.contains(&tag.as_str()) {
                        buffer.push_break();
                        self.quote_into(child, buffer);
                        buffer.push_break();
                    } else {
                        self.visit_inline(child, buffer);
                    }
                }
                _ => {}
            }
        }
    }

    fn code_of(&mut self, element: ElementRef) -> Option<CodeBlock> {
        let (block, warning) = self.extractor.formatter.format(element);
        self.warnings.extend(warning);
        (!block.text.trim().is_empty()).then_some(block)
    }

    fn visible_text(&self, element: ElementRef) -> String {
        collapse_whitespace(&self.raw_visible_text(element))
    }

    /// Text of `element` without denylisted descendants, whitespace untouched.
    fn raw_visible_text(&self, element: ElementRef) -> String {
        let mut out = String::new();
        self.append_visible_text(*element, &mut out);
        out
    }

    fn append_visible_text(&self, node: NodeRef<Node>, out: &mut String) {
        for child in node.children() {
            match child.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        if self.extractor.deny(element).is_none() {
                            self.append_visible_text(child, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{clean_byline, resolve_url, InlineBuffer};
    use article_core::InlineSpan;
    use url::Url;

    #[test]
    fn bylines_lose_prefixes() {
        assert_eq!(clean_byline("  By Jane Doe "), Some("Jane Doe".to_string()));
        assert_eq!(clean_byline("— by  Max\nMustermann"), Some("Max Mustermann".to_string()));
        assert_eq!(clean_byline("by"), None);
    }

    #[test]
    fn relative_urls_resolve_and_fragments_are_skipped() {
        let base = Url::parse("https://base.example.com/docs/page").ok();
        assert_eq!(
            resolve_url("./other", base.as_ref()).map(String::from),
            Some("https://base.example.com/docs/other".to_string())
        );
        assert_eq!(resolve_url("#top", base.as_ref()), None);
        assert_eq!(resolve_url("javascript:void(0)", base.as_ref()), None);
        assert_eq!(resolve_url("/x", None), None);
    }

    #[test]
    fn inline_buffer_collapses_whitespace_and_trims_edges() {
        let mut buffer = InlineBuffer::default();
        buffer.push_text("  Hello \n ");
        buffer.push_wrapped(" world ", InlineSpan::Bold);
        buffer.push_text(" ! ");
        let (spans, images) = buffer.finish();

        assert_eq!(
            spans,
            vec![
                InlineSpan::Text("Hello ".to_string()),
                InlineSpan::Bold("world".to_string()),
                InlineSpan::Text(" !".to_string()),
            ]
        );
        assert!(images.is_empty());
    }

    #[test]
    fn bracket_only_paragraphs_are_dropped() {
        let mut buffer = InlineBuffer::default();
        buffer.push_text(" [ ] ");
        let (spans, _) = buffer.finish();
        assert!(spans.is_empty());
    }
}
