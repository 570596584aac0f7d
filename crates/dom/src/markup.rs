//! Markup fragment parser
//!
//! Turns an HTML snippet into the children of a detached container. This is the
//! lenient, browser-flavoured subset needed for `insertAdjacentHTML`-style
//! insertion:
//! - start/end tags with quoted, unquoted and bare attributes
//! - void elements and `/>` on them
//! - comments, doctype/processing-instruction skipping
//! - raw text for `script`/`style`, decoded text for `textarea`/`title`
//! - character references in text and attribute values
//! - stray end tags ignored, unclosed elements closed at the end
//! - same-name `li`/`p`/`option`/... siblings closing each other
//!
//! Malformed input never fails; it degrades the way a browser would.

use crate::document::Document;
use crate::error::Result;
use crate::types::{NodeId, NodeType};
use crate::utils;

/// Elements that implicitly close an open element of the same name
const SELF_CLOSING_SIBLINGS: &[&str] = &["li", "p", "option", "dt", "dd", "tr", "td", "th"];

/// Block-level start tags that implicitly close an open `<p>`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "pre", "section", "table",
    "ul",
];

/// Parse `html` into `container`, which must be an empty fragment or element
pub fn parse_into(doc: &mut Document, container: NodeId, html: &str) -> Result<()> {
    let mut parser = FragmentParser {
        doc,
        src: html,
        pos: 0,
        stack: vec![container],
    };
    parser.run()?;
    tracing::trace!(
        "Parsed {} bytes of markup into node {}",
        html.len(),
        container
    );
    Ok(())
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
}

struct FragmentParser<'d, 's> {
    doc: &'d mut Document,
    src: &'s str,
    pos: usize,
    /// Open elements; index 0 is the container itself
    stack: Vec<NodeId>,
}

impl<'d, 's> FragmentParser<'d, 's> {
    fn rest(&self) -> &'s str {
        let src: &'s str = self.src;
        &src[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    fn current_tag(&self) -> Result<Option<String>> {
        Ok(self
            .doc
            .node(self.current())?
            .tag_name()
            .map(str::to_string))
    }

    fn run(&mut self) -> Result<()> {
        while self.pos < self.src.len() {
            let rest = self.rest();

            if let Some(body) = rest.strip_prefix("<!--") {
                let (comment, consumed) = match body.find("-->") {
                    Some(end) => (&body[..end], 4 + end + 3),
                    None => (body, rest.len()),
                };
                let comment_id = self.doc.create_comment(comment);
                self.doc.append_child(self.current(), comment_id)?;
                self.pos += consumed;
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past('>');
                continue;
            }

            if let Some(after) = rest.strip_prefix("</") {
                if after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    self.pos += 2;
                    let name = self.read_tag_name();
                    self.skip_past('>');
                    self.close_element(&name)?;
                } else {
                    self.skip_past('>');
                }
                continue;
            }

            if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                match self.read_start_tag() {
                    Some(tag) => self.open_element(tag)?,
                    // Unterminated tag at end of input is dropped
                    None => self.pos = self.src.len(),
                }
                continue;
            }

            // Text run up to the next '<' (a lone '<' is text)
            let skip = usize::from(rest.starts_with('<'));
            let end = rest[skip..]
                .find('<')
                .map(|i| i + skip)
                .unwrap_or(rest.len());
            let text = utils::decode_character_references(&rest[..end]);
            self.append_text(&text)?;
            self.pos += end;
        }
        Ok(())
    }

    fn skip_past(&mut self, delimiter: char) {
        self.pos = match self.rest().find(delimiter) {
            Some(idx) => self.pos + idx + delimiter.len_utf8(),
            None => self.src.len(),
        };
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pos += rest.len() - trimmed.len();
    }

    fn read_until(&mut self, stop: impl Fn(char) -> bool) -> &'s str {
        let rest = self.rest();
        let end = rest.find(stop).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn read_tag_name(&mut self) -> String {
        self.read_until(|c| c.is_ascii_whitespace() || c == '/' || c == '>')
            .replace('\0', "\u{fffd}")
            .to_ascii_lowercase()
    }

    /// Parse `<name attr=...>` starting at `self.pos`; `None` if input ends first
    fn read_start_tag(&mut self) -> Option<StartTag> {
        self.pos += 1;
        let name = self.read_tag_name();
        let mut attributes: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return None;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            // `/>` only matters for void elements, which close anyway
            if rest.starts_with("/>") {
                self.pos += 2;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }

            // A leading '=' belongs to the attribute name
            let lead = usize::from(rest.starts_with('='));
            self.pos += lead;
            let tail = self.read_until(|c| c.is_ascii_whitespace() || matches!(c, '/' | '>' | '='));
            let attr_name = format!("{}{}", &rest[..lead], tail).to_ascii_lowercase();

            self.skip_whitespace();
            let mut value = String::new();
            if self.rest().starts_with('=') {
                self.pos += 1;
                self.skip_whitespace();
                let rest = self.rest();
                match rest.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let close = rest[1..].find(quote)?;
                        value = utils::decode_character_references(&rest[1..1 + close]);
                        self.pos += close + 2;
                    }
                    Some(_) => {
                        let raw = self.read_until(|c| c.is_ascii_whitespace() || c == '>');
                        value = utils::decode_character_references(raw);
                    }
                    None => return None,
                }
            }

            // First occurrence wins, like the HTML tokenizer
            if !attributes.iter().any(|(existing, _)| *existing == attr_name) {
                attributes.push((attr_name, value));
            }
        }

        Some(StartTag { name, attributes })
    }

    fn open_element(&mut self, tag: StartTag) -> Result<()> {
        if let Some(open) = self.current_tag()? {
            let same_sibling = open == tag.name && SELF_CLOSING_SIBLINGS.contains(&open.as_str());
            let closes_p = open == "p" && CLOSES_PARAGRAPH.contains(&tag.name.as_str());
            if same_sibling || closes_p {
                self.stack.pop();
            }
        }

        let element = self.doc.create_element(&tag.name)?;
        for (name, value) in tag.attributes {
            if utils::is_valid_attribute_name(&name) {
                self.doc.set_attribute(element, &name, value)?;
            } else {
                tracing::trace!("Dropping attribute with invalid name {:?}", name);
            }
        }
        self.doc.append_child(self.current(), element)?;

        if utils::is_void_element(&tag.name) {
            return Ok(());
        }
        if utils::is_raw_text_element(&tag.name) || utils::is_escapable_raw_text_element(&tag.name)
        {
            return self.read_raw_text(element, &tag.name);
        }
        self.stack.push(element);
        Ok(())
    }

    fn read_raw_text(&mut self, element: NodeId, name: &str) -> Result<()> {
        let rest = self.rest();
        let needle = format!("</{}", name);
        let end = rest.to_ascii_lowercase().find(&needle).unwrap_or(rest.len());
        let raw = &rest[..end];

        if !raw.is_empty() {
            let text = if utils::is_escapable_raw_text_element(name) {
                utils::decode_character_references(raw)
            } else {
                raw.to_string()
            };
            self.doc.append_text(element, text)?;
        }

        self.pos += end;
        if self.pos < self.src.len() {
            self.skip_past('>');
        }
        Ok(())
    }

    fn close_element(&mut self, name: &str) -> Result<()> {
        for depth in (1..self.stack.len()).rev() {
            let node = self.doc.node(self.stack[depth])?;
            if node.tag_name() == Some(name) {
                self.stack.truncate(depth);
                return Ok(());
            }
        }
        tracing::trace!("Ignoring stray end tag </{}>", name);
        Ok(())
    }

    /// Append text to the open element, merging with a preceding text node
    fn append_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let parent = self.current();
        let last = self.doc.node(parent)?.children_ids.last().copied();
        if let Some(last) = last {
            let last_node = self.doc.node_mut(last)?;
            if last_node.node_type == NodeType::Text {
                last_node.node_value.push_str(text);
                return Ok(());
            }
        }
        self.doc.append_text(parent, text)?;
        Ok(())
    }
}
