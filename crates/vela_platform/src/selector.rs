//! Element selectors
//!
//! The subset of CSS selectors a page script needs to find its elements:
//! type (`section`), class (`.card`), id (`#faq`), attribute presence
//! (`[id]`), equality (`[href="#about"]`) and prefix (`[href^="#"]`)
//! matchers, the descendant combinator (`.nav-menu a`) and selector lists
//! (`.card, .hero h1`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use vela_core::ElementId;

use crate::page::Page;

/// Failed to parse a selector
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {offset} in `{input}`")]
    Unexpected {
        input: String,
        found: char,
        offset: usize,
    },

    #[error("unterminated attribute selector in `{0}`")]
    UnterminatedAttribute(String),
}

/// Attribute condition inside `[...]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrMatcher {
    Exists(String),
    Equals(String, String),
    Prefix(String, String),
}

impl AttrMatcher {
    fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (AttrMatcher::Exists(_), Some(_)) => true,
            (AttrMatcher::Equals(_, want), Some(v)) => v == want,
            (AttrMatcher::Prefix(_, prefix), Some(v)) => v.starts_with(prefix.as_str()),
            (_, None) => false,
        }
    }

    fn name(&self) -> &str {
        match self {
            AttrMatcher::Exists(n) | AttrMatcher::Equals(n, _) | AttrMatcher::Prefix(n, _) => n,
        }
    }
}

/// A sequence of simple selectors that all apply to one element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttrMatcher>,
}

impl Compound {
    fn matches<P: Page + ?Sized>(&self, page: &P, el: ElementId) -> bool {
        if let Some(tag) = &self.tag {
            match page.tag_name(el) {
                Some(actual) if actual.eq_ignore_ascii_case(tag) => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.id {
            if page.attribute(el, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| page.has_class(el, c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|m| m.matches(page.attribute(el, m.name()).as_deref()))
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
    }
}

/// Compounds joined by descendant combinators; the last one is the subject
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
}

impl Complex {
    fn matches<P: Page + ?Sized>(&self, page: &P, el: ElementId) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(page, el) {
            return false;
        }

        // Greedy right-to-left ancestor walk is exact for descendant-only chains
        let mut cursor = page.parent(el);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(node) = cursor else {
                    return false;
                };
                cursor = page.parent(node);
                if compound.matches(page, node) {
                    break;
                }
            }
        }
        true
    }
}

/// A parsed selector list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        for part in split_top_level(input, |c| c == ',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(SelectorError::Empty);
            }
            let compounds = split_top_level(part, |c| c.is_ascii_whitespace())
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(|s| parse_compound(input, s))
                .collect::<Result<Vec<_>, _>>()?;
            alternatives.push(Complex { compounds });
        }
        if alternatives.is_empty() {
            return Err(SelectorError::Empty);
        }

        Ok(Selector {
            source: input.trim().to_string(),
            alternatives,
        })
    }

    /// Whether `el` matches any alternative in the list
    pub fn matches<P: Page + ?Sized>(&self, page: &P, el: ElementId) -> bool {
        self.alternatives.iter().any(|c| c.matches(page, el))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Split on separator characters outside of `[...]` and quotes
fn split_top_level(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && is_sep(c) => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(input: &str, text: &str) -> Result<Compound, SelectorError> {
    let unexpected = |found: char, offset: usize| SelectorError::Unexpected {
        input: input.to_string(),
        found,
        offset,
    };

    let mut compound = Compound::default();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let mut ident = String::new();
        while let Some(&(_, c)) = chars.get(*i) {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            *i += 1;
        }
        ident
    };

    while let Some(&(offset, c)) = chars.get(i) {
        match c {
            '*' if i == 0 => i += 1,
            c if is_ident_char(c) && i == 0 => {
                compound.tag = Some(read_ident(&mut i).to_ascii_lowercase());
            }
            '.' | '#' => {
                i += 1;
                let ident = read_ident(&mut i);
                if ident.is_empty() {
                    return Err(unexpected(c, offset));
                }
                if c == '.' {
                    compound.classes.push(ident);
                } else {
                    compound.id = Some(ident);
                }
            }
            '[' => {
                let rest = &text[offset + 1..];
                let end = find_attr_end(rest)
                    .ok_or_else(|| SelectorError::UnterminatedAttribute(input.to_string()))?;
                compound
                    .attributes
                    .push(parse_attribute(&rest[..end]).ok_or_else(|| unexpected('[', offset))?);
                let consumed = offset + 1 + end + 1;
                while chars.get(i).is_some_and(|&(o, _)| o < consumed) {
                    i += 1;
                }
            }
            other => return Err(unexpected(other, offset)),
        }
    }

    if compound.is_empty() && text != "*" {
        return Err(SelectorError::Empty);
    }
    Ok(compound)
}

fn find_attr_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attribute(body: &str) -> Option<AttrMatcher> {
    let unquote = |v: &str| {
        let v = v.trim();
        v.strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| v.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(v)
            .to_string()
    };
    let valid_name = |n: &str| !n.is_empty() && n.chars().all(is_ident_char);

    if let Some((name, value)) = body.split_once("^=") {
        let name = name.trim();
        return valid_name(name).then(|| AttrMatcher::Prefix(name.to_string(), unquote(value)));
    }
    if let Some((name, value)) = body.split_once('=') {
        let name = name.trim();
        return valid_name(name).then(|| AttrMatcher::Equals(name.to_string(), unquote(value)));
    }
    let name = body.trim();
    valid_name(name).then(|| AttrMatcher::Exists(name.to_string()))
}
