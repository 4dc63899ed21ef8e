use article_core::{
    normalize_article_url, Article, Block, ImageReference, ImageRegistry, InlineSpan,
};
use pretty_assertions::assert_eq;

#[test]
fn registry_assigns_indices_in_first_seen_order() {
    let mut registry = ImageRegistry::new();
    let urls = [
        "https://cdn.example/a.png",
        "https://cdn.example/b.gif",
        "https://cdn.example/a.png",
        "https://cdn.example/c",
    ];
    let indices: Vec<_> = urls.iter().map(|url| registry.register(url)).collect();

    assert_eq!(indices, vec![0, 1, 0, 2]);
    assert_eq!(registry.len(), 3);
    let names: Vec<_> = registry
        .references()
        .iter()
        .map(ImageReference::placeholder_name)
        .collect();
    assert_eq!(names, vec!["img_001.png", "img_002.gif", "img_003.jpg"]);
}

#[test]
fn registry_is_deterministic_across_runs() {
    let urls = ["https://x/1.png", "https://x/2.png", "https://x/1.png"];
    let build = || {
        let mut registry = ImageRegistry::new();
        for url in urls {
            registry.register(url);
        }
        registry
    };

    assert_eq!(build(), build());
    assert_eq!(build().get(1).map(|r| r.original_url.as_str()), Some("https://x/2.png"));
    assert!(build().get(2).is_none());
}

#[test]
fn article_lists_images_in_document_order_including_lists() {
    let article = Article {
        title: "T".to_string(),
        author: None,
        published: None,
        blocks: vec![
            Block::Image {
                src: "https://x/first.png".to_string(),
                alt: "first".to_string(),
            },
            Block::List {
                ordered: false,
                items: vec![
                    Block::Paragraph(vec![InlineSpan::Text("item".to_string())]),
                    Block::Image {
                        src: "https://x/nested.png".to_string(),
                        alt: "nested".to_string(),
                    },
                ],
            },
        ],
    };

    assert_eq!(
        article.image_urls(),
        vec!["https://x/first.png", "https://x/nested.png"]
    );
}

#[test]
fn heading_constructor_clamps_level() {
    assert_eq!(Block::heading(0, "a"), Block::Heading { level: 1, text: "a".into() });
    assert_eq!(Block::heading(9, "b"), Block::Heading { level: 6, text: "b".into() });
}

#[test]
fn urls_without_scheme_default_to_https() {
    assert_eq!(
        normalize_article_url(" example.com/post#comments "),
        Some("https://example.com/post".to_string())
    );
    assert_eq!(
        normalize_article_url("http://example.com/a"),
        Some("http://example.com/a".to_string())
    );
    assert_eq!(normalize_article_url("   "), None);
    assert_eq!(normalize_article_url("ftp://example.com/file"), None);
}
