//! Selector strategies
//!
//! A `By` value is the `(strategy, value)` pair an element is located with.
//! Each strategy compiles to a JavaScript expression that yields the matching
//! elements below a root node.

use crate::{Error, Result};
use phf::phf_map;
use std::fmt;

/// Selector strategy without its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Id,
    Class,
    Css,
    LinkText,
    PartialLinkText,
    Name,
    XPath,
}

/// Accepted spellings of each strategy, as found in page tables and configs
static STRATEGY_ALIASES: phf::Map<&'static str, Strategy> = phf_map! {
    "id" => Strategy::Id,
    "class" => Strategy::Class,
    "classname" => Strategy::Class,
    "class name" => Strategy::Class,
    "css" => Strategy::Css,
    "css selector" => Strategy::Css,
    "linktext" => Strategy::LinkText,
    "link text" => Strategy::LinkText,
    "partiallinktext" => Strategy::PartialLinkText,
    "partial link text" => Strategy::PartialLinkText,
    "name" => Strategy::Name,
    "xpath" => Strategy::XPath,
};

impl Strategy {
    /// Parse a strategy name, ignoring case, dashes and underscores
    pub fn parse(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        STRATEGY_ALIASES
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| Error::configuration(format!("Unknown selector strategy: {}", name)))
    }

    /// Name used in diagnostic labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Class => "class",
            Strategy::Css => "css",
            Strategy::LinkText => "link text",
            Strategy::PartialLinkText => "partial link text",
            Strategy::Name => "name",
            Strategy::XPath => "xpath",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct By {
    strategy: Strategy,
    value: String,
}

impl By {
    /// Build a selector from a strategy and a value
    pub fn new<S: Into<String>>(strategy: Strategy, value: S) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Build a selector from a strategy name such as `"link text"`
    pub fn parse<S: Into<String>>(strategy: &str, value: S) -> Result<Self> {
        Ok(Self::new(Strategy::parse(strategy)?, value))
    }

    pub fn id<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Id, value)
    }

    pub fn class<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Class, value)
    }

    pub fn css<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Css, value)
    }

    pub fn link_text<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    pub fn partial_link_text<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::PartialLinkText, value)
    }

    pub fn name<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Name, value)
    }

    pub fn xpath<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::XPath, value)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Diagnostic label for a slot bound to this selector
    pub fn label_for(&self, slot: &str) -> String {
        format!("By: {}, On: {}", self.strategy, slot)
    }

    /// JavaScript expression evaluating to an array of the matching elements below `root`
    pub fn query_expression(&self, root: &str) -> String {
        let value = js_string(&self.value);
        match self.strategy {
            Strategy::Id => format!("Array.from({}.querySelectorAll('#' + CSS.escape({})))", root, value),
            Strategy::Class => format!("Array.from({}.getElementsByClassName({}))", root, value),
            Strategy::Css => format!("Array.from({}.querySelectorAll({}))", root, value),
            Strategy::LinkText => format!(
                "Array.from({}.querySelectorAll('a')).filter(a => (a.innerText || a.textContent || '').trim() === {})",
                root, value
            ),
            Strategy::PartialLinkText => format!(
                "Array.from({}.querySelectorAll('a')).filter(a => (a.innerText || a.textContent || '').includes({}))",
                root, value
            ),
            Strategy::Name => format!(
                "Array.from({}.querySelectorAll('[name=\"' + CSS.escape({}) + '\"]'))",
                root, value
            ),
            Strategy::XPath => format!(
                "(() => {{ const snap = document.evaluate({}, {}, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i)); return out; }})()",
                value, root
            ),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Quote a string as a JavaScript literal
pub(crate) fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_aliases() {
        assert_eq!(Strategy::parse("ID").unwrap(), Strategy::Id);
        assert_eq!(Strategy::parse("link-text").unwrap(), Strategy::LinkText);
        assert_eq!(Strategy::parse("partial_link_text").unwrap(), Strategy::PartialLinkText);
        assert_eq!(Strategy::parse("css selector").unwrap(), Strategy::Css);
        assert!(matches!(Strategy::parse("shadow"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_label_format() {
        assert_eq!(By::id("submit").label_for("submitButton"), "By: id, On: submitButton");
        assert_eq!(
            By::partial_link_text("Gift").label_for("giftCardLink"),
            "By: partial link text, On: giftCardLink"
        );
    }

    #[test]
    fn test_query_expression_quotes_value() {
        let expr = By::css("input[name='q']").query_expression("document");
        assert_eq!(expr, "Array.from(document.querySelectorAll(\"input[name='q']\"))");

        let expr = By::link_text("Say \"hi\"").query_expression("root");
        assert!(expr.contains(r#"=== "Say \"hi\"""#));
    }

    #[test]
    fn test_xpath_uses_root_as_context() {
        let expr = By::xpath("//option").query_expression("root");
        assert!(expr.contains("document.evaluate(\"//option\", root"));
        assert!(expr.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
    }

    #[test]
    fn test_display() {
        assert_eq!(By::name("email").to_string(), "name=email");
    }
}
