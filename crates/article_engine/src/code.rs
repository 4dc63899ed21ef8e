//! Code block reconstruction: language detection, raw text capture and fencing.

use std::sync::LazyLock;

use article_core::CodeBlock;
use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::ElementRef;

static LANGUAGE_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:language|lang)[-_]([a-z0-9+#._-]+)$").expect("hardcoded regex is valid")
});

/// Unknown language names are only used as fence tags when they look like one.
static LANGUAGE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9+#._-]+$").expect("hardcoded regex is valid"));

const LANGUAGE_ATTRIBUTES: &[&str] = &["data-lang", "data-language", "language"];

/// Class tokens that highlighters add without naming a language.
const IGNORED_CLASS_TOKENS: &[&str] = &["hljs", "highlight", "prettyprint", "code", "sourcecode"];

/// Alias → canonical fence tag.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("javascript", "javascript"),
    ("jsx", "jsx"),
    ("ts", "typescript"),
    ("typescript", "typescript"),
    ("tsx", "tsx"),
    ("py", "python"),
    ("python", "python"),
    ("python3", "python"),
    ("rb", "ruby"),
    ("ruby", "ruby"),
    ("php", "php"),
    ("java", "java"),
    ("kotlin", "kotlin"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("c++", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("c#", "csharp"),
    ("csharp", "csharp"),
    ("go", "go"),
    ("golang", "go"),
    ("rs", "rust"),
    ("rust", "rust"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "bash"),
    ("shell", "bash"),
    ("console", "bash"),
    ("shell-session", "bash"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("json", "json"),
    ("toml", "toml"),
    ("ini", "ini"),
    ("html", "html"),
    ("xml", "xml"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("sql", "sql"),
    ("graphql", "graphql"),
    ("proto", "protobuf"),
    ("protobuf", "protobuf"),
    ("dockerfile", "dockerfile"),
    ("docker", "dockerfile"),
    ("make", "makefile"),
    ("makefile", "makefile"),
    ("cmake", "cmake"),
    ("gradle", "gradle"),
    ("groovy", "groovy"),
    ("lua", "lua"),
    ("r", "r"),
    ("matlab", "matlab"),
    ("perl", "perl"),
    ("ps", "powershell"),
    ("ps1", "powershell"),
    ("powershell", "powershell"),
    ("hcl", "hcl"),
    ("terraform", "hcl"),
    ("diff", "diff"),
    ("markdown", "markdown"),
    ("md", "markdown"),
    ("scala", "scala"),
    ("haskell", "haskell"),
    ("hs", "haskell"),
    ("elixir", "elixir"),
    ("ex", "elixir"),
    ("erlang", "erlang"),
    ("clojure", "clojure"),
    ("dart", "dart"),
    ("zig", "zig"),
    ("nix", "nix"),
    ("text", "text"),
    ("plaintext", "text"),
];

/// Non-fatal problems found while formatting code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormattingWarning {
    #[error("unrecognized code language `{token}`; fence emitted without a tag")]
    UnrecognizedLanguage { token: String },
}

/// Canonical fence tag for a language alias, if the alias is known.
pub fn canonical_language(alias: &str) -> Option<&'static str> {
    let alias = alias.trim().trim_start_matches('.').to_ascii_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(key, _)| *key == alias)
        .map(|(_, canonical)| *canonical)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CodeBlockFormatter;

impl CodeBlockFormatter {
    /// Builds a [`CodeBlock`] from a `<pre>` (or bare `<code>`) element.
    ///
    /// The inner `<code>` is preferred for text when present; language markers
    /// are read from the `pre` first, then from the `code`.
    pub fn format(&self, element: ElementRef) -> (CodeBlock, Option<FormattingWarning>) {
        let code = element
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name().eq_ignore_ascii_case("code"));
        let text_source = code.unwrap_or(element);

        let mut raw = String::new();
        collect_raw_text(*text_source, &mut raw);
        let text = strip_single_blank_edges(&raw.replace("\r\n", "\n"));

        let mut sources = vec![element];
        sources.extend(code);
        let (language, warning) = detect_language(&sources);

        (CodeBlock { language, text }, warning)
    }

    /// Renders a fenced block whose fence no run of backticks in the body can close.
    pub fn render(&self, block: &CodeBlock) -> String {
        let fence = "`".repeat(fence_length(&block.text));
        let language = block
            .language
            .as_deref()
            .filter(|language| LANGUAGE_TOKEN_RE.is_match(language))
            .unwrap_or_default();
        format!("{fence}{language}\n{text}\n{fence}", text = block.text)
    }
}

/// Longest backtick run plus one, never shorter than three.
pub fn fence_length(text: &str) -> usize {
    (longest_backtick_run(text) + 1).max(3)
}

/// Inline code span delimited by one more backtick than the longest run inside.
pub fn inline_code_span(text: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(text) + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{ticks} {text} {ticks}")
    } else {
        format!("{ticks}{text}{ticks}")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn detect_language(sources: &[ElementRef]) -> (Option<String>, Option<FormattingWarning>) {
    for element in sources {
        for attr in LANGUAGE_ATTRIBUTES {
            if let Some(value) = element.value().attr(attr) {
                let value = value.trim().to_ascii_lowercase();
                if value.is_empty() {
                    continue;
                }
                if let Some(language) = canonical_language(&value) {
                    return (Some(language.to_string()), None);
                }
                if LANGUAGE_TOKEN_RE.is_match(&value) {
                    return (Some(value), None);
                }
                return (None, Some(FormattingWarning::UnrecognizedLanguage { token: value }));
            }
        }
    }

    let mut warning = None;
    for element in sources {
        for class in element.value().classes() {
            let token = class.to_ascii_lowercase();
            if IGNORED_CLASS_TOKENS.contains(&token.as_str()) {
                continue;
            }
            if let Some(captures) = LANGUAGE_CLASS_RE.captures(&token) {
                let key = &captures[1];
                match canonical_language(key) {
                    Some(language) => return (Some(language.to_string()), None),
                    None => {
                        warning.get_or_insert(FormattingWarning::UnrecognizedLanguage {
                            token: key.to_string(),
                        });
                    }
                }
            } else if let Some(language) = canonical_language(&token) {
                return (Some(language.to_string()), None);
            }
        }
    }
    (None, warning)
}

/// Text exactly as it appears in the element: entities are already decoded by
/// the parser and `<br>` counts as a line break.
fn collect_raw_text(node: NodeRef<Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name().eq_ignore_ascii_case("br") => out.push('\n'),
            Node::Element(_) => collect_raw_text(child, out),
            _ => {}
        }
    }
}

fn strip_single_blank_edges(text: &str) -> String {
    let text = text.strip_prefix('\n').unwrap_or(text);
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::{canonical_language, fence_length, inline_code_span, strip_single_blank_edges};

    #[test]
    fn fence_is_one_longer_than_longest_run() {
        assert_eq!(fence_length("plain"), 3);
        assert_eq!(fence_length("a `tick`"), 3);
        assert_eq!(fence_length("``two``"), 3);
        assert_eq!(fence_length("```rust\nx\n```"), 4);
        assert_eq!(fence_length("`````"), 6);
    }

    #[test]
    fn inline_spans_pad_edge_backticks() {
        assert_eq!(inline_code_span("x"), "`x`");
        assert_eq!(inline_code_span("a`b"), "``a`b``");
        assert_eq!(inline_code_span("`tick"), "`` `tick ``");
    }

    #[test]
    fn aliases_map_to_canonical_tags() {
        assert_eq!(canonical_language("JS"), Some("javascript"));
        assert_eq!(canonical_language("c++"), Some("cpp"));
        assert_eq!(canonical_language(".py"), Some("python"));
        assert_eq!(canonical_language("c#"), Some("csharp"));
        assert_eq!(canonical_language("brainfuck"), None);
    }

    #[test]
    fn only_one_blank_edge_is_stripped() {
        assert_eq!(strip_single_blank_edges("\n\nx\n\n"), "\nx\n");
        assert_eq!(strip_single_blank_edges("  x  "), "  x  ");
    }
}
