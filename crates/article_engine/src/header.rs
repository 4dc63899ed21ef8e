use article_core::Article;

use crate::render::{escape_href, escape_text};

/// Caller-supplied facts about one export that are not part of the article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub source_url: String,
    /// Already formatted; the renderer never reads a clock.
    pub export_date: String,
}

impl DocumentMeta {
    pub fn new(source_url: impl Into<String>, export_date: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            export_date: export_date.into(),
        }
    }
}

/// Title line, metadata bullets and the closing rule, without a trailing newline.
pub fn document_header(article: &Article, meta: &DocumentMeta) -> String {
    let mut lines = vec![format!("# {}", escape_text(&article.title)), String::new()];
    if let Some(author) = &article.author {
        lines.push(format!("- Author: {}", escape_text(author)));
    }
    if let Some(published) = &article.published {
        lines.push(format!("- Published: {}", escape_text(published)));
    }
    lines.push(format!(
        "- Original URL: [{text}]({href})",
        text = escape_text(&meta.source_url),
        href = escape_href(&meta.source_url),
    ));
    lines.push(format!("- Exported: {}", meta.export_date));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{document_header, DocumentMeta};
    use article_core::Article;

    #[test]
    fn optional_fields_are_omitted() {
        let article = Article {
            title: "Plain".to_string(),
            ..Article::default()
        };
        let meta = DocumentMeta::new("https://a.example/p", "2024-05-01");
        assert_eq!(
            document_header(&article, &meta),
            "# Plain\n\n- Original URL: [https://a.example/p](https://a.example/p)\n- Exported: 2024-05-01\n\n---"
        );
    }

    #[test]
    fn author_and_date_are_listed_before_the_url() {
        let article = Article {
            title: "T".to_string(),
            author: Some("Ada".to_string()),
            published: Some("2024-01-02".to_string()),
            blocks: Vec::new(),
        };
        let header = document_header(&article, &DocumentMeta::new("https://a.example", "d"));
        let lines: Vec<_> = header.lines().collect();
        assert_eq!(lines[2], "- Author: Ada");
        assert_eq!(lines[3], "- Published: 2024-01-02");
        assert!(lines[4].starts_with("- Original URL: "));
    }
}
