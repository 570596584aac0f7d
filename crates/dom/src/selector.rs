//! CSS selector parsing and matching
//!
//! Supported grammar:
//! - type (`div`), universal (`*`), `#id`, `.class`
//! - attribute conditions `[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`;
//!   quoted values may contain `]`, `,` and whitespace
//! - pseudo-classes `:first-child`, `:last-child`, `:only-child`, `:empty`,
//!   `:not(<compound>, ...)`
//! - compound selectors (`li.item[data-id]:not(.done)`)
//! - combinators: descendant (` `), child (`>`), adjacent (`+`), general sibling (`~`)
//! - selector lists (`a, b`)
//!
//! Anything else is rejected with [`DomError::InvalidSelector`] rather than
//! silently matching nothing.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId, NodeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Equals(String, String),
    Includes(String, String),
    Prefix(String, String),
    Suffix(String, String),
    Substring(String, String),
}

impl AttrCondition {
    fn matches(&self, node: &DomNode) -> bool {
        match self {
            AttrCondition::Exists(key) => node.attr(key).is_some(),
            AttrCondition::Equals(key, value) => node.attr(key) == Some(value.as_str()),
            AttrCondition::Includes(key, value) => node
                .attr(key)
                .map(|v| v.split_ascii_whitespace().any(|token| token == value))
                .unwrap_or(false),
            AttrCondition::Prefix(key, value) => node
                .attr(key)
                .map(|v| !value.is_empty() && v.starts_with(value.as_str()))
                .unwrap_or(false),
            AttrCondition::Suffix(key, value) => node
                .attr(key)
                .map(|v| !value.is_empty() && v.ends_with(value.as_str()))
                .unwrap_or(false),
            AttrCondition::Substring(key, value) => node
                .attr(key)
                .map(|v| !value.is_empty() && v.contains(value.as_str()))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Not(Vec<Compound>),
}

impl Pseudo {
    fn parse(name: &str, argument: Option<&str>) -> Option<Self> {
        match (name.to_ascii_lowercase().as_str(), argument) {
            ("first-child", None) => Some(Pseudo::FirstChild),
            ("last-child", None) => Some(Pseudo::LastChild),
            ("only-child", None) => Some(Pseudo::OnlyChild),
            ("empty", None) => Some(Pseudo::Empty),
            ("not", Some(inner)) => {
                let mut list = Vec::new();
                for group in split_groups(inner)? {
                    match tokenize(group)?.as_slice() {
                        [single] => list.push(parse_compound(single)?),
                        _ => return None,
                    }
                }
                Some(Pseudo::Not(list))
            }
            _ => None,
        }
    }

    fn matches(&self, arena: &DomArena, node_id: NodeId) -> Result<bool> {
        Ok(match self {
            Pseudo::FirstChild => previous_element_sibling(arena, node_id)?.is_none(),
            Pseudo::LastChild => next_element_sibling(arena, node_id)?.is_none(),
            Pseudo::OnlyChild => {
                previous_element_sibling(arena, node_id)?.is_none()
                    && next_element_sibling(arena, node_id)?.is_none()
            }
            Pseudo::Empty => {
                for &child in &arena.get(node_id)?.children_ids {
                    if arena.get(child)?.node_type != NodeType::Comment {
                        return Ok(false);
                    }
                }
                true
            }
            Pseudo::Not(list) => {
                for compound in list {
                    if compound.matches(arena, node_id)? {
                        return Ok(false);
                    }
                }
                true
            }
        })
    }
}

/// One compound selector, e.g. `li.item[data-id]:first-child`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudos: Vec<Pseudo>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudos.is_empty()
    }

    fn matches(&self, arena: &DomArena, node_id: NodeId) -> Result<bool> {
        let node = arena.get(node_id)?;
        if !node.is_element() {
            return Ok(false);
        }
        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return Ok(false);
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return Ok(false);
            }
        }
        if !self.classes.iter().all(|class| node.has_class(class))
            || !self.attrs.iter().all(|cond| cond.matches(node))
        {
            return Ok(false);
        }
        for pseudo in &self.pseudos {
            if !pseudo.matches(arena, node_id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    compound: Compound,
    /// Relation to the previous (left) part; `None` for the first part
    combinator: Option<Combinator>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    groups: Vec<Vec<Part>>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let invalid = || DomError::InvalidSelector(selector.to_string());

        let mut groups = Vec::new();
        for group in split_groups(selector).ok_or_else(invalid)? {
            groups.push(parse_chain(group).ok_or_else(invalid)?);
        }

        Ok(Self {
            source: selector.to_string(),
            groups,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `node_id` matches any selector in the list
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> Result<bool> {
        for chain in &self.groups {
            if matches_chain(arena, node_id, chain)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn split_groups(selector: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (idx, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                groups.push(selector[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    groups.push(selector[start..].trim());

    if groups.iter().any(|g| g.is_empty()) {
        return None;
    }
    Some(groups)
}

/// Split one group into compound tokens and combinator tokens
fn tokenize(group: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in group.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | ')' => {
                depth = depth.checked_sub(1)?;
                current.push(ch);
            }
            '>' | '+' | '~' if depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_ascii_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Some(tokens)
}

fn parse_chain(group: &str) -> Option<Vec<Part>> {
    let mut parts: Vec<Part> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(group)? {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || parts.is_empty() {
                return None;
            }
            pending = Some(combinator);
            continue;
        }

        let compound = parse_compound(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part {
            compound,
            combinator,
        });
    }

    if parts.is_empty() || pending.is_some() {
        return None;
    }
    Some(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let end = src[start..]
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map(|(i, _)| start + i)
        .unwrap_or(src.len());
    if end == start {
        return None;
    }
    Some((src[start..end].to_string(), end))
}

/// Byte index of the bracket closing the one at `open`, skipping quoted text
fn find_closing(src: &str, open: usize) -> Option<usize> {
    let open_ch = src[open..].chars().next()?;
    let close_ch = match open_ch {
        '[' => ']',
        '(' => ')',
        _ => return None,
    };
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (idx, ch) in src[open..].char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, c) if c == open_ch => depth += 1,
            (None, c) if c == close_ch => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut i = 0usize;

    while i < token.len() {
        let c = token[i..].chars().next()?;
        match c {
            '*' => {
                if compound.universal || compound.tag.is_some() || i != 0 {
                    return None;
                }
                compound.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = read_ident(token, i + 1)?;
                if compound.id.replace(id).is_some() {
                    return None;
                }
                i = next;
            }
            '.' => {
                let (class, next) = read_ident(token, i + 1)?;
                compound.classes.push(class);
                i = next;
            }
            '[' => {
                let close = find_closing(token, i)?;
                compound.attrs.push(parse_attr_condition(&token[i + 1..close])?);
                i = close + 1;
            }
            ':' => {
                let (name, next) = read_ident(token, i + 1)?;
                if token[next..].starts_with('(') {
                    let close = find_closing(token, next)?;
                    let pseudo = Pseudo::parse(&name, Some(token[next + 1..close].trim()))?;
                    compound.pseudos.push(pseudo);
                    i = close + 1;
                } else {
                    compound.pseudos.push(Pseudo::parse(&name, None)?);
                    i = next;
                }
            }
            _ => {
                if i != 0 {
                    return None;
                }
                let (tag, next) = read_ident(token, i)?;
                compound.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if compound.is_empty() {
        return None;
    }
    Some(compound)
}

fn parse_attr_condition(body: &str) -> Option<AttrCondition> {
    let body = body.trim();
    let Some(eq) = body.find('=') else {
        let (name, next) = read_ident(body, 0)?;
        if next != body.len() {
            return None;
        }
        return Some(AttrCondition::Exists(name.to_ascii_lowercase()));
    };

    let (raw_name, operator) = match body[..eq].chars().last()? {
        op @ ('~' | '^' | '$' | '*') => (&body[..eq - 1], Some(op)),
        _ => (&body[..eq], None),
    };
    let name = raw_name.trim();
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    let name = name.to_ascii_lowercase();
    let value = unquote(body[eq + 1..].trim())?;

    Some(match operator {
        None => AttrCondition::Equals(name, value),
        Some('~') => AttrCondition::Includes(name, value),
        Some('^') => AttrCondition::Prefix(name, value),
        Some('$') => AttrCondition::Suffix(name, value),
        Some(_) => AttrCondition::Substring(name, value),
    })
}

fn unquote(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    match chars.next() {
        Some(q @ ('"' | '\'')) => {
            let inner = raw.strip_prefix(q)?.strip_suffix(q)?;
            Some(inner.to_string())
        }
        Some(_) if raw.chars().all(is_ident_char) => Some(raw.to_string()),
        _ => None,
    }
}

fn previous_element_sibling(arena: &DomArena, node_id: NodeId) -> Result<Option<NodeId>> {
    let Some(parent_id) = arena.get(node_id)?.parent_id else {
        return Ok(None);
    };
    let mut previous = None;
    for &sibling in &arena.get(parent_id)?.children_ids {
        if sibling == node_id {
            return Ok(previous);
        }
        if arena.get(sibling)?.is_element() {
            previous = Some(sibling);
        }
    }
    Ok(None)
}

fn next_element_sibling(arena: &DomArena, node_id: NodeId) -> Result<Option<NodeId>> {
    let Some(parent_id) = arena.get(node_id)?.parent_id else {
        return Ok(None);
    };
    let siblings = &arena.get(parent_id)?.children_ids;
    let start = siblings
        .iter()
        .position(|&id| id == node_id)
        .map(|p| p + 1)
        .unwrap_or(siblings.len());
    for &sibling in &siblings[start..] {
        if arena.get(sibling)?.is_element() {
            return Ok(Some(sibling));
        }
    }
    Ok(None)
}

/// Match right-to-left: the last part must match `node_id`, then each
/// combinator walks to an ancestor or sibling matching the part before it
fn matches_chain(arena: &DomArena, node_id: NodeId, parts: &[Part]) -> Result<bool> {
    let Some((last, rest)) = parts.split_last() else {
        return Ok(false);
    };
    if !last.compound.matches(arena, node_id)? {
        return Ok(false);
    }
    let Some(combinator) = last.combinator else {
        return Ok(rest.is_empty());
    };

    match combinator {
        Combinator::Child => match arena.parent(node_id)? {
            Some(parent) => matches_chain(arena, parent, rest),
            None => Ok(false),
        },
        Combinator::Descendant => {
            let mut cursor = arena.parent(node_id)?;
            while let Some(ancestor) = cursor {
                if matches_chain(arena, ancestor, rest)? {
                    return Ok(true);
                }
                cursor = arena.parent(ancestor)?;
            }
            Ok(false)
        }
        Combinator::AdjacentSibling => match previous_element_sibling(arena, node_id)? {
            Some(sibling) => matches_chain(arena, sibling, rest),
            None => Ok(false),
        },
        Combinator::GeneralSibling => {
            let mut cursor = previous_element_sibling(arena, node_id)?;
            while let Some(sibling) = cursor {
                if matches_chain(arena, sibling, rest)? {
                    return Ok(true);
                }
                cursor = previous_element_sibling(arena, sibling)?;
            }
            Ok(false)
        }
    }
}
