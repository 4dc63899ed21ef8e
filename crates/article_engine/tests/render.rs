use std::collections::BTreeMap;

use article_core::{Article, Block, CodeBlock, ImageMode, InlineSpan};
use article_engine::{ContentExtractor, DocumentMeta, Extractor, MarkdownRenderer};
use pretty_assertions::assert_eq;

fn meta() -> DocumentMeta {
    DocumentMeta::new("https://x.example/post", "2024-05-01")
}

fn text(s: &str) -> InlineSpan {
    InlineSpan::Text(s.to_string())
}

fn image(src: &str, alt: &str) -> Block {
    Block::Image {
        src: src.to_string(),
        alt: alt.to_string(),
    }
}

fn sample_article() -> Article {
    Article {
        title: "My Post".to_string(),
        author: Some("Ann".to_string()),
        published: None,
        blocks: vec![
            Block::Heading {
                level: 2,
                text: "Intro".to_string(),
            },
            Block::Paragraph(vec![text("Hello "), InlineSpan::Bold("world".to_string())]),
            Block::CodeBlock(CodeBlock {
                language: Some("rust".to_string()),
                text: "fn main() {}".to_string(),
            }),
            Block::List {
                ordered: false,
                items: vec![
                    Block::Paragraph(vec![text("a")]),
                    Block::List {
                        ordered: true,
                        items: vec![Block::Paragraph(vec![text("b")])],
                    },
                    Block::Paragraph(vec![text("c")]),
                ],
            },
            Block::Blockquote(vec![text("q1\n\nq2")]),
            image("https://x.example/p.png", "pic"),
            Block::Link {
                text: "Next".to_string(),
                href: "https://x.example/next".to_string(),
            },
        ],
    }
}

const EXPECTED_HEAD: &str = "# My Post

- Author: Ann
- Original URL: [https://x.example/post](https://x.example/post)
- Exported: 2024-05-01

---

## Intro

Hello **world**

```rust
fn main() {}
```

- a
  1. b
- c

> q1
>
> q2
";

#[test]
fn every_block_kind_renders() {
    let rendered = MarkdownRenderer::new(ImageMode::Embed).render(&sample_article(), &meta());
    let expected = format!("{EXPECTED_HEAD}\n![pic](img_001.png)\n\n[Next](https://x.example/next)\n");
    assert_eq!(rendered.markdown(), expected);
}

#[test]
fn finalize_substitutes_names_and_drops_failures() {
    let rendered = MarkdownRenderer::new(ImageMode::Embed).render(&sample_article(), &meta());

    let mut resolved = BTreeMap::new();
    resolved.insert(0, "photo.png".to_string());
    assert!(rendered.finalize(&resolved).contains("\n![pic](photo.png)\n"));

    let dropped = rendered.finalize(&BTreeMap::new());
    assert_eq!(dropped, format!("{EXPECTED_HEAD}\n[Next](https://x.example/next)\n"));
}

#[test]
fn image_indices_follow_first_appearance() {
    let article = Article {
        title: "T".to_string(),
        blocks: vec![
            image("https://x.example/a.png", "A"),
            Block::Paragraph(vec![text("between")]),
            image("https://x.example/b", "B"),
            image("https://x.example/a.png", "A again"),
        ],
        ..Article::default()
    };
    let rendered = MarkdownRenderer::new(ImageMode::Embed).render(&article, &meta());

    let urls: Vec<_> = rendered
        .images()
        .iter()
        .map(|r| (r.sequence_index, r.original_url.as_str()))
        .collect();
    assert_eq!(
        urls,
        vec![(0, "https://x.example/a.png"), (1, "https://x.example/b")]
    );
    let markdown = rendered.markdown();
    assert!(markdown.contains("![A](img_001.png)"));
    assert!(markdown.contains("![B](img_002.jpg)"));
    assert!(markdown.contains("![A again](img_001.png)"));

    let again = MarkdownRenderer::new(ImageMode::Embed).render(&article, &meta());
    assert_eq!(again.images(), rendered.images());
}

#[test]
fn strip_mode_never_emits_placeholders() {
    let html = r#"<html><head><title>T</title></head><body><article><p>See <img src="https://x/y.png"> this</p><img src="https://x/z.png"></article></body></html>"#;
    let article = ContentExtractor::default()
        .extract(html, Some("https://x/"))
        .unwrap()
        .article;

    let rendered = MarkdownRenderer::new(ImageMode::Strip).render(&article, &meta());
    let markdown = rendered.markdown();
    assert!(!markdown.contains("img_"));
    assert!(!markdown.contains("!["));
    assert!(markdown.contains("\nSee this\n"));
    assert!(rendered.images().is_empty());
}

#[test]
fn rendering_twice_is_byte_identical() {
    let html = r#"<html><head><title>Twice</title></head><body><article><h2>A</h2><p>One <code>x</code></p><pre><code class="language-sh">echo `date`</code></pre><img src="/i.gif"></article></body></html>"#;
    let extractor = ContentExtractor::default();
    let first = extractor.extract(html, Some("https://x.example/")).unwrap().article;
    let second = extractor.extract(html, Some("https://x.example/")).unwrap().article;

    let renderer = MarkdownRenderer::new(ImageMode::Embed);
    assert_eq!(
        renderer.render(&first, &meta()).markdown(),
        renderer.render(&second, &meta()).markdown()
    );
}

#[test]
fn headings_are_clamped_and_text_is_escaped() {
    let article = Article {
        title: "T".to_string(),
        blocks: vec![
            Block::Heading {
                level: 9,
                text: "deep_name".to_string(),
            },
            Block::Paragraph(vec![text("# not a heading *really*")]),
        ],
        ..Article::default()
    };
    let markdown = MarkdownRenderer::new(ImageMode::Embed)
        .render(&article, &meta())
        .markdown();
    assert!(markdown.contains("\n###### deep\\_name\n"));
    assert!(markdown.contains("\n\\# not a heading \\*really\\*\n"));
}

#[test]
fn code_with_triple_backticks_gets_four_tick_fence() {
    let article = Article {
        title: "T".to_string(),
        blocks: vec![Block::CodeBlock(CodeBlock {
            language: None,
            text: "```\ninner\n```".to_string(),
        })],
        ..Article::default()
    };
    let markdown = MarkdownRenderer::new(ImageMode::Embed)
        .render(&article, &meta())
        .markdown();
    assert!(markdown.ends_with("\n````\n```\ninner\n```\n````\n"));
}

#[test]
fn paragraph_text_never_turns_into_structure() {
    let html = r#"<html><head><title>T</title></head><body><article><p>1. Not a list</p><p>- dash text</p><p>+ plus</p><p>Use &lt;div&gt; tags &amp;amp; more</p></article></body></html>"#;
    let article = ContentExtractor::default()
        .extract(html, Some("https://x.example/"))
        .unwrap()
        .article;

    let markdown = MarkdownRenderer::new(ImageMode::Embed)
        .render(&article, &meta())
        .markdown();
    let body = markdown.split("\n---\n").nth(1).unwrap();
    assert_eq!(
        body,
        "\n1\\. Not a list\n\n\\- dash text\n\n\\+ plus\n\nUse \\<div> tags \\&amp; more\n"
    );
}
