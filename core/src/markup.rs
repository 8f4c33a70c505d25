//! Seed-markup loading.
//!
//! Documents can be pre-seeded from a markup string before the first render.
//! The loader accepts a well-formed subset: a doctype (skipped), elements
//! with quoted or unquoted attributes, void and self-closing elements,
//! comments, text, and raw text inside `style`/`script` elements. CSS and
//! script contents are retained as literal text and never interpreted here.

use crate::{Document, DocumentError, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

impl Document {
    /// Builds a document from seed markup.
    ///
    /// Top-level nodes become children of the synthetic root, matching how
    /// a full document string (`<html>…</html>`) seeds the tree.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Markup`] when the input is not part of the
    /// supported well-formed subset.
    pub fn from_markup(input: &str) -> Result<Self, DocumentError> {
        let mut doc = Self::empty();
        let root = doc.root();
        Parser::new(input).parse_into(&mut doc, root)?;
        Ok(doc)
    }
}

struct Parser<'src> {
    input: &'src str,
    bytes: &'src [u8],
    pos: usize,
}

impl<'src> Parser<'src> {
    const fn new(input: &'src str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> DocumentError {
        DocumentError::Markup {
            position: self.pos,
            message: message.into(),
        }
    }

    fn parse_into(&mut self, doc: &mut Document, root: NodeId) -> Result<(), DocumentError> {
        // Stack of open elements; `root` is the insertion point when empty.
        let mut open: Vec<(NodeId, String)> = Vec::new();

        while self.pos < self.bytes.len() {
            let parent = open.last().map_or(root, |(id, _)| *id);

            if self.starts_with("<!--") {
                let content = self.take_comment()?;
                let comment = doc.create_comment(content);
                doc.append(comment, parent);
            } else if self.starts_with("<!") {
                self.skip_doctype()?;
            } else if self.starts_with("</") {
                let tag = self.take_close_tag()?;
                match open.pop() {
                    Some((_, open_tag)) if open_tag == tag => {}
                    Some((_, open_tag)) => {
                        return Err(
                            self.error(format!("expected `</{open_tag}>`, found `</{tag}>`"))
                        );
                    }
                    None => return Err(self.error(format!("unmatched `</{tag}>`"))),
                }
            } else if self.starts_with("<") {
                let (tag, attrs, self_closing) = self.take_open_tag()?;
                let attr_refs: Vec<(&str, &str)> = attrs
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
                    .collect();
                let element = doc.create_element(tag.clone(), &attr_refs);
                doc.append(element, parent);

                if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                    continue;
                }
                if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                    let content = self.take_raw_text(&tag)?;
                    if !content.is_empty() {
                        let text = doc.create_text(content);
                        doc.append(text, element);
                    }
                } else {
                    open.push((element, tag));
                }
            } else {
                let content = self.take_text();
                if !content.trim().is_empty() {
                    let text = doc.create_text(content);
                    doc.append(text, parent);
                }
            }
        }

        if let Some((_, tag)) = open.pop() {
            return Err(self.error(format!("unclosed element `<{tag}>`")));
        }
        Ok(())
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    fn take_text(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'<' {
            self.pos += 1;
        }
        self.input[start..self.pos].to_string()
    }

    fn take_comment(&mut self) -> Result<String, DocumentError> {
        self.pos += "<!--".len();
        let start = self.pos;
        let Some(end) = self.input[self.pos..].find("-->") else {
            return Err(self.error("unterminated comment"));
        };
        self.pos += end + "-->".len();
        Ok(self.input[start..start + end].trim().to_string())
    }

    fn skip_doctype(&mut self) -> Result<(), DocumentError> {
        let Some(end) = self.input[self.pos..].find('>') else {
            return Err(self.error("unterminated doctype"));
        };
        self.pos += end + 1;
        Ok(())
    }

    fn take_close_tag(&mut self) -> Result<String, DocumentError> {
        self.pos += "</".len();
        let tag = self.take_name()?;
        self.skip_whitespace();
        self.expect(b'>')?;
        Ok(tag)
    }

    #[allow(clippy::type_complexity)]
    fn take_open_tag(&mut self) -> Result<(String, Vec<(String, String)>, bool), DocumentError> {
        self.pos += "<".len();
        let tag = self.take_name()?;
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    return Ok((tag, attrs, false));
                }
                Some(b'/') => {
                    self.pos += 1;
                    self.expect(b'>')?;
                    return Ok((tag, attrs, true));
                }
                Some(_) => {
                    let name = self.take_name()?;
                    let value = if self.peek() == Some(b'=') {
                        self.pos += 1;
                        self.take_attribute_value()?
                    } else {
                        String::new()
                    };
                    attrs.push((name, value));
                }
                None => return Err(self.error(format!("unterminated `<{tag}` tag"))),
            }
        }
    }

    fn take_attribute_value(&mut self) -> Result<String, DocumentError> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
                    self.pos += 1;
                }
                if self.pos >= self.bytes.len() {
                    return Err(self.error("unterminated attribute value"));
                }
                let value = self.input[start..self.pos].to_string();
                self.pos += 1;
                Ok(value)
            }
            Some(_) => {
                let start = self.pos;
                while self.pos < self.bytes.len()
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'>'
                    && self.bytes[self.pos] != b'/'
                {
                    self.pos += 1;
                }
                Ok(self.input[start..self.pos].to_string())
            }
            None => Err(self.error("expected an attribute value")),
        }
    }

    /// Consumes literal content up to the matching close tag of a raw-text
    /// element, then the close tag itself.
    fn take_raw_text(&mut self, tag: &str) -> Result<String, DocumentError> {
        let close = format!("</{tag}");
        let rest = &self.input[self.pos..];
        let Some(end) = rest.to_ascii_lowercase().find(&close) else {
            return Err(self.error(format!("unclosed element `<{tag}>`")));
        };
        let content = rest[..end].trim().to_string();
        self.pos += end;
        let _ = self.take_close_tag()?;
        Ok(content)
    }

    fn take_name(&mut self) -> Result<String, DocumentError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(self.input[start..self.pos].to_ascii_lowercase())
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    const fn peek(&self) -> Option<u8> {
        if self.pos < self.bytes.len() {
            Some(self.bytes[self.pos])
        } else {
            None
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), DocumentError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", char::from(byte))))
        }
    }
}

const fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte == b':'
}
