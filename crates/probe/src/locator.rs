//! Element selectors for the page driver.
//!
//! A [`Selector`] names elements the way a test reads: by CSS, by label,
//! by visible text or by ARIA role and accessible name. The browser driver
//! turns it into a JavaScript query; the mock driver uses [`Selector::key`]
//! to look up its in-memory elements.

use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "#country option")
    Css(String),
    /// Form control associated with a label, or carrying the `aria-label`
    Label(String),
    /// Innermost element whose text contains the string
    Text(String),
    /// Innermost element whose text matches the regular expression
    TextPattern(String),
    /// Element with an ARIA role and accessible name
    Role {
        /// ARIA role (e.g., "cell", "columnheader")
        role: String,
        /// Accessible name, matched against trimmed text
        name: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a label selector
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a regex text selector
    #[must_use]
    pub fn text_pattern(pattern: impl Into<String>) -> Self {
        Self::TextPattern(pattern.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Stable textual key, used by the mock driver and in logs
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Css(s) => format!("css={s}"),
            Self::Label(l) => format!("label={l}"),
            Self::Text(t) => format!("text={t}"),
            Self::TextPattern(p) => format!("text=/{p}/"),
            Self::Role { role, name } => format!("role={role}[name={name}]"),
        }
    }

    /// JavaScript expression evaluating to an array of every match
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::Label(l) => format!(
                "Array.from(document.querySelectorAll('label'))\
                 .filter(l => l.textContent.trim() === {l:?})\
                 .map(l => l.control || (l.htmlFor && document.getElementById(l.htmlFor)))\
                 .filter(Boolean)\
                 .concat(Array.from(document.querySelectorAll('[aria-label={l:?}]')))"
            ),
            Self::Text(t) => innermost(&format!("el.textContent.includes({t:?})")),
            Self::TextPattern(p) => innermost(&format!("new RegExp({p:?}).test(el.textContent)")),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll({css:?}))\
                 .filter(el => (el.getAttribute('aria-label') || el.textContent).trim() === {name:?})",
                css = role_css(role)
            ),
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            _ => format!("({})[0] || null", self.to_all_query()),
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelectorAll({s:?}).length"),
            _ => format!("({}).length", self.to_all_query()),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

// Elements matching `predicate` that have no child also matching it.
fn innermost(predicate: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll('body *'))\
         .filter(el => {predicate})\
         .filter(el => !Array.from(el.children).some(c => (el => {predicate})(c)))"
    )
}

fn role_css(role: &str) -> String {
    let implicit = match role {
        "cell" => Some("td"),
        "columnheader" => Some("th"),
        "row" => Some("tr"),
        "table" => Some("table"),
        "button" => Some("button, input[type=button], input[type=submit]"),
        "checkbox" => Some("input[type=checkbox]"),
        "radio" => Some("input[type=radio]"),
        "textbox" => Some("input:not([type]), input[type=text], textarea"),
        "combobox" | "listbox" => Some("select"),
        "option" => Some("option"),
        "link" => Some("a[href]"),
        _ => None,
    };
    match implicit {
        Some(css) => format!("{css}, [role={role}]"),
        None => format!("[role={role}]"),
    }
}

/// How to pick an option in a `<select>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOption {
    /// Match the `value` attribute
    Value(String),
    /// Match the visible label
    Label(String),
    /// Match the zero-based position
    Index(usize),
    /// Match either the value or the label
    Text(String),
}

impl SelectOption {
    /// Whether an option with this `value`, `label` and position matches
    #[must_use]
    pub fn matches(&self, value: &str, label: &str, index: usize) -> bool {
        match self {
            Self::Value(v) => v == value,
            Self::Label(l) => l == label.trim(),
            Self::Index(i) => *i == index,
            Self::Text(t) => t == value || t == label.trim(),
        }
    }

    /// JavaScript predicate over `(o, i)` for an option element and its index
    #[must_use]
    pub fn to_predicate(&self) -> String {
        match self {
            Self::Value(v) => format!("o.value === {v:?}"),
            Self::Label(l) => format!("o.label.trim() === {l:?}"),
            Self::Index(i) => format!("i === {i}"),
            Self::Text(t) => format!("(o.value === {t:?} || o.label.trim() === {t:?})"),
        }
    }
}

impl From<&str> for SelectOption {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<usize> for SelectOption {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for SelectOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "value={v}"),
            Self::Label(l) => write!(f, "label={l}"),
            Self::Index(i) => write!(f, "index={i}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}
