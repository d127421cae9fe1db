//! Minimal CSS selector support for in-memory hosts.
//!
//! Supported: type selectors, `*`, `.class`, `#id`, `[attr]`,
//! `[attr=value]` / `[attr="value"]`, descendant combinators (whitespace)
//! and selector lists (`,`).

use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::PageError;

/// Read access a selector needs from one element.
pub trait SelectorSubject {
    fn tag_name(&self) -> &str;
    fn attribute_value(&self, name: &str) -> Option<&str>;
    fn has_class_name(&self, class: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeFilter {
    Present(String),
    Equals(String, String),
}

/// One compound selector such as `section[id]` or `a.nav-link.active`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: SmallVec<[String; 2]>,
    pub attributes: SmallVec<[AttributeFilter; 1]>,
}

impl CompoundSelector {
    #[must_use]
    pub fn matches(&self, subject: &dyn SelectorSubject) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(subject.tag_name()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if subject.attribute_value("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| subject.has_class_name(class)) {
            return false;
        }
        self.attributes.iter().all(|filter| match filter {
            AttributeFilter::Present(name) => subject.attribute_value(name).is_some(),
            AttributeFilter::Equals(name, value) => {
                subject.attribute_value(name) == Some(value.as_str())
            }
        })
    }
}

/// Descendant chain; the last compound is the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
}

impl ComplexSelector {
    /// `path` runs from the document root down to the candidate element.
    #[must_use]
    pub fn matches_path(&self, path: &[&dyn SelectorSubject]) -> bool {
        let Some((subject, ancestors)) = path.split_last() else {
            return false;
        };
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(*subject) {
            return false;
        }

        // Greedy upward search is exact for descendant-only chains.
        let mut remaining = ancestors.len();
        for compound in rest.iter().rev() {
            let found = ancestors[..remaining]
                .iter()
                .rposition(|ancestor| compound.matches(*ancestor));
            match found {
                Some(position) => remaining = position,
                None => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<ComplexSelector>,
}

impl Selector {
    #[must_use]
    pub fn matches_path(&self, path: &[&dyn SelectorSubject]) -> bool {
        self.groups.iter().any(|group| group.matches_path(path))
    }

    #[must_use]
    pub fn groups(&self) -> &[ComplexSelector] {
        &self.groups
    }
}

impl FromStr for Selector {
    type Err = PageError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut groups = Vec::new();
        for group in split_top_level(input, ',')? {
            let compounds = split_compounds(group)?
                .into_iter()
                .map(parse_compound)
                .collect::<Result<Vec<_>, _>>()?;
            if compounds.is_empty() {
                return Err(PageError::InvalidSelector(format!(
                    "empty selector group in `{input}`"
                )));
            }
            groups.push(ComplexSelector { compounds });
        }
        Ok(Self { groups })
    }
}

fn split_top_level(input: &str, separator: char) -> Result<Vec<&str>, PageError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    PageError::InvalidSelector(format!("unbalanced `]` in `{input}`"))
                })?;
            }
            c if c == separator && depth == 0 => {
                parts.push(&input[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(PageError::InvalidSelector(format!(
            "unbalanced `[` in `{input}`"
        )));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn split_compounds(group: &str) -> Result<Vec<&str>, PageError> {
    let mut compounds = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (index, ch) in group.char_indices() {
        match ch {
            '[' => {
                depth += 1;
                start.get_or_insert(index);
            }
            ']' => {
                depth = depth.saturating_sub(1);
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    compounds.push(&group[begin..index]);
                }
            }
            '>' | '+' | '~' if depth == 0 => {
                return Err(PageError::InvalidSelector(format!(
                    "combinator `{ch}` is not supported in `{group}`"
                )));
            }
            _ => {
                start.get_or_insert(index);
            }
        }
    }
    if let Some(begin) = start {
        compounds.push(&group[begin..]);
    }
    Ok(compounds)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn take_ident(chars: &[char], mut index: usize) -> (String, usize) {
    let begin = index;
    while index < chars.len() && is_ident_char(chars[index]) {
        index += 1;
    }
    (chars[begin..index].iter().collect(), index)
}

fn parse_compound(input: &str) -> Result<CompoundSelector, PageError> {
    let invalid = |reason: &str| PageError::InvalidSelector(format!("{reason} in `{input}`"));
    let chars: Vec<char> = input.chars().collect();
    let mut compound = CompoundSelector::default();
    let mut index = 0;

    if chars.first() == Some(&'*') {
        compound.tag = Some("*".to_owned());
        index = 1;
    } else if chars.first().is_some_and(|ch| is_ident_char(*ch)) {
        let (tag, next) = take_ident(&chars, 0);
        compound.tag = Some(tag);
        index = next;
    }

    while index < chars.len() {
        match chars[index] {
            '.' => {
                let (class, next) = take_ident(&chars, index + 1);
                if class.is_empty() {
                    return Err(invalid("empty class name"));
                }
                compound.classes.push(class);
                index = next;
            }
            '#' => {
                let (id, next) = take_ident(&chars, index + 1);
                if id.is_empty() {
                    return Err(invalid("empty id"));
                }
                compound.id = Some(id);
                index = next;
            }
            '[' => {
                let close = chars[index..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .map(|offset| index + offset)
                    .ok_or_else(|| invalid("unterminated attribute selector"))?;
                let body: String = chars[index + 1..close].iter().collect();
                compound.attributes.push(parse_attribute_filter(body.trim(), &invalid)?);
                index = close + 1;
            }
            other => return Err(invalid(&format!("unexpected `{other}`"))),
        }
    }

    if compound == CompoundSelector::default() {
        return Err(invalid("empty compound selector"));
    }
    Ok(compound)
}

fn parse_attribute_filter(
    body: &str,
    invalid: &dyn Fn(&str) -> PageError,
) -> Result<AttributeFilter, PageError> {
    match body.split_once('=') {
        None => {
            if body.is_empty() || !body.chars().all(is_ident_char) {
                return Err(invalid("bad attribute name"));
            }
            Ok(AttributeFilter::Present(body.to_owned()))
        }
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(invalid("bad attribute name"));
            }
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))
                .unwrap_or(value);
            Ok(AttributeFilter::Equals(name.to_owned(), unquoted.to_owned()))
        }
    }
}
