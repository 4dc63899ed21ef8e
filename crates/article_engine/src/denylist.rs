//! Markers for regions that are never article content.
//!
//! The table is plain data so it can be tuned and tested without parsing any
//! HTML: [`Denylist::classify`] takes a tag name, class tokens and an id.

/// How a rule recognises an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyPattern {
    /// Element name, compared case-insensitively.
    Tag(String),
    /// A `-`, `_` or space separated segment of a class token or the id.
    Word(String),
    /// Substring of a class token or the id.
    Substring(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyAction {
    /// Skipped silently (scripts, styles, widgets).
    Discard,
    /// Skipped, and counted against the container it sits in.
    Boilerplate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyRule {
    pub pattern: DenyPattern,
    pub action: DenyAction,
}

impl DenyRule {
    pub fn new(pattern: DenyPattern, action: DenyAction) -> Self {
        Self { pattern, action }
    }

    fn matches(&self, tag: &str, classes: &[String], id: Option<&str>) -> bool {
        let mut names = classes.iter().map(String::as_str).chain(id);
        match &self.pattern {
            DenyPattern::Tag(name) => name.eq_ignore_ascii_case(tag),
            DenyPattern::Word(word) => names.any(|name| {
                name.split(['-', '_', ' '])
                    .any(|segment| segment.eq_ignore_ascii_case(word))
            }),
            DenyPattern::Substring(needle) => names.any(|name| name.contains(needle.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denylist {
    rules: Vec<DenyRule>,
}

const DISCARD_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "template", "svg", "button", "canvas",
    "object", "embed", "select", "input", "textarea",
];
const BOILERPLATE_TAGS: &[&str] = &["nav", "header", "footer", "aside", "menu", "dialog"];
const BOILERPLATE_WORDS: &[&str] = &[
    "ad", "ads", "nav", "menu", "share", "social", "related", "recommended", "promo", "sponsor",
    "sponsored", "popup", "modal", "breadcrumb", "breadcrumbs", "pagination", "toolbar",
    "masthead", "widget",
];
const BOILERPLATE_SUBSTRINGS: &[&str] = &[
    "advert", "navigation", "sidebar", "comment", "footer", "newsletter", "cookie", "subscribe",
    "banner",
];

impl Default for Denylist {
    fn default() -> Self {
        let tags = DISCARD_TAGS
            .iter()
            .map(|t| DenyRule::new(DenyPattern::Tag(t.to_string()), DenyAction::Discard))
            .chain(
                BOILERPLATE_TAGS
                    .iter()
                    .map(|t| DenyRule::new(DenyPattern::Tag(t.to_string()), DenyAction::Boilerplate)),
            );
        let words = BOILERPLATE_WORDS
            .iter()
            .map(|w| DenyRule::new(DenyPattern::Word(w.to_string()), DenyAction::Boilerplate));
        let substrings = BOILERPLATE_SUBSTRINGS.iter().map(|s| {
            DenyRule::new(DenyPattern::Substring(s.to_string()), DenyAction::Boilerplate)
        });

        Self {
            rules: tags.chain(words).chain(substrings).collect(),
        }
    }
}

impl Denylist {
    pub fn new(rules: Vec<DenyRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[DenyRule] {
        &self.rules
    }

    pub fn push(&mut self, rule: DenyRule) {
        self.rules.push(rule);
    }

    /// Action of the first matching rule, if any. Class tokens and the id are
    /// compared in lowercase.
    pub fn classify<'a>(
        &self,
        tag: &str,
        classes: impl IntoIterator<Item = &'a str>,
        id: Option<&str>,
    ) -> Option<DenyAction> {
        let classes: Vec<String> = classes.into_iter().map(str::to_ascii_lowercase).collect();
        let id = id.map(str::to_ascii_lowercase);
        self.rules
            .iter()
            .find(|rule| rule.matches(tag, &classes, id.as_deref()))
            .map(|rule| rule.action)
    }
}

#[cfg(test)]
mod tests {
    use super::{DenyAction, DenyPattern, DenyRule, Denylist};

    const NO_CLASSES: [&str; 0] = [];

    #[test]
    fn tags_are_matched_by_name() {
        let list = Denylist::default();
        assert_eq!(list.classify("SCRIPT", NO_CLASSES, None), Some(DenyAction::Discard));
        assert_eq!(list.classify("nav", NO_CLASSES, None), Some(DenyAction::Boilerplate));
        assert_eq!(list.classify("p", NO_CLASSES, None), None);
    }

    #[test]
    fn words_do_not_match_inside_longer_words() {
        let list = Denylist::default();
        assert_eq!(list.classify("div", ["ad"], None), Some(DenyAction::Boilerplate));
        assert_eq!(list.classify("div", ["top-ad-slot"], None), Some(DenyAction::Boilerplate));
        assert_eq!(list.classify("div", ["content-header", "download"], None), None);
        assert_eq!(list.classify("div", ["readable"], None), None);
    }

    #[test]
    fn substrings_match_class_and_id() {
        let list = Denylist::default();
        assert_eq!(
            list.classify("div", ["CommentList"], None),
            Some(DenyAction::Boilerplate)
        );
        assert_eq!(
            list.classify("section", NO_CLASSES, Some("left-sidebar")),
            Some(DenyAction::Boilerplate)
        );
        assert_eq!(list.classify("div", ["content"], Some("main")), None);
    }

    #[test]
    fn custom_rules_are_honoured_in_order() {
        let mut list = Denylist::empty();
        list.push(DenyRule::new(
            DenyPattern::Word("promo".to_string()),
            DenyAction::Discard,
        ));
        assert_eq!(list.classify("div", ["promo"], None), Some(DenyAction::Discard));
        assert_eq!(list.classify("nav", NO_CLASSES, None), None);
        assert_eq!(list.rules().len(), 1);
    }
}
