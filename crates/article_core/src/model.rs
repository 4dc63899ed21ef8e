/// Deepest heading Markdown can express.
pub const MAX_HEADING_LEVEL: u8 = 6;

/// One extracted article, built once from a single parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    pub title: String,
    pub author: Option<String>,
    pub published: Option<String>,
    pub blocks: Vec<Block>,
}

impl Article {
    /// Image URLs in document order, including those nested inside lists.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls = Vec::new();
        for block in &self.blocks {
            collect_image_urls(block, &mut urls);
        }
        urls
    }
}

fn collect_image_urls<'a>(block: &'a Block, urls: &mut Vec<&'a str>) {
    match block {
        Block::Image { src, .. } => urls.push(src),
        Block::List { items, .. } => {
            for item in items {
                collect_image_urls(item, urls);
            }
        }
        _ => {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<InlineSpan>),
    CodeBlock(CodeBlock),
    Image { src: String, alt: String },
    /// A `Paragraph` item opens a new list entry; any other block continues
    /// the entry before it.
    List { ordered: bool, items: Vec<Block> },
    Link { text: String, href: String },
    Blockquote(Vec<InlineSpan>),
}

impl Block {
    /// Heading with its level clamped into `1..=MAX_HEADING_LEVEL`.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::Heading {
            level: level.clamp(1, MAX_HEADING_LEVEL),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineSpan {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { text: String, href: String },
}

impl InlineSpan {
    pub fn is_blank(&self) -> bool {
        match self {
            InlineSpan::Text(text)
            | InlineSpan::Bold(text)
            | InlineSpan::Italic(text)
            | InlineSpan::Code(text) => text.trim().is_empty(),
            InlineSpan::Link { text, .. } => text.trim().is_empty(),
        }
    }
}
