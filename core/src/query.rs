//! Selector parsing and first-match lookup over the retained tree.
//!
//! The grammar is the subset the bootstrap and event wiring paths need:
//! compound simple selectors (`tag`, `#id`, `.class`, any combination such
//! as `div.card#main`) joined by whitespace descendant combinators.

use crate::{Document, DocumentError, NodeId, node::ElementData};

/// A parsed selector: a chain of compound selectors, matched right to left
/// with descendant semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parses selector text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Selector`] when the text is empty or not
    /// part of the supported grammar.
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        let error = |message: &str| DocumentError::Selector {
            selector: input.to_string(),
            message: message.to_string(),
        };

        let mut compounds = Vec::new();
        for part in input.split_ascii_whitespace() {
            compounds.push(parse_compound(part).map_err(|message| error(message))?);
        }
        if compounds.is_empty() {
            return Err(error("selector is empty"));
        }
        Ok(Self { compounds })
    }

    /// Returns `true` when `node` matches the full selector chain.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !matches_compound(doc, node, last) {
            return false;
        }

        // Walk the remaining compounds upward; descendant combinators are
        // satisfied greedily, which is complete when only descendants are
        // involved.
        let mut current = doc.parent(node);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = doc.parent(candidate);
                if matches_compound(doc, candidate, compound) {
                    break;
                }
            }
        }
        true
    }
}

fn matches_compound(doc: &Document, node: NodeId, compound: &Compound) -> bool {
    let Some(data) = doc.node(node).and_then(crate::node::Node::as_element) else {
        return false;
    };
    compound_applies(data, compound)
}

fn compound_applies(data: &ElementData, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag
        && !data.tag().eq_ignore_ascii_case(tag)
    {
        return false;
    }
    if let Some(id) = &compound.id
        && data.id() != Some(id.as_str())
    {
        return false;
    }
    compound.classes.iter().all(|class| data.has_class(class))
}

fn parse_compound(input: &str) -> Result<Compound, &'static str> {
    let bytes = input.as_bytes();
    let mut compound = Compound::default();
    let mut pos = 0;

    if pos < bytes.len() && bytes[pos] != b'#' && bytes[pos] != b'.' {
        let (tag, next) = take_identifier(input, pos)?;
        compound.tag = Some(tag.to_ascii_lowercase());
        pos = next;
    }

    while pos < bytes.len() {
        let marker = bytes[pos];
        pos += 1;
        let (name, next) = take_identifier(input, pos)?;
        pos = next;
        match marker {
            b'#' => {
                if compound.id.replace(name.to_string()).is_some() {
                    return Err("more than one id qualifier");
                }
            }
            b'.' => compound.classes.push(name.to_string()),
            _ => return Err("unsupported selector syntax"),
        }
    }

    Ok(compound)
}

fn take_identifier(input: &str, start: usize) -> Result<(&str, usize), &'static str> {
    let bytes = input.as_bytes();
    let mut end = start;
    while end < bytes.len() && is_identifier_byte(bytes[end]) {
        end += 1;
    }
    if end == start {
        return Err("expected an identifier");
    }
    Ok((&input[start..end], end))
}

const fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_'
}

impl Document {
    /// Resolves the first node in document order matching `selector`.
    /// `Ok(None)` means nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Selector`] when the selector text cannot be
    /// parsed.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DocumentError> {
        let parsed = Selector::parse(selector)?;
        Ok(self.first_match(self.root(), &parsed))
    }

    fn first_match(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        if selector.matches(self, node) {
            return Some(node);
        }
        for child in self.children(node) {
            if let Some(found) = self.first_match(*child, selector) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.query_selector("body").expect("parse").expect("body");
        let card = doc.create_element("div", &[("class", "card primary")]);
        let title = doc.create_element("h1", &[("id", "title"), ("class", "card")]);
        doc.insert(card, body, None).expect("insert card");
        doc.insert(title, card, None).expect("insert title");
        (doc, body, card, title)
    }

    #[test]
    fn matches_by_tag() {
        let (doc, _, card, _) = sample();
        assert_eq!(doc.query_selector("div").expect("parse"), Some(card));
        assert_eq!(doc.query_selector("video").expect("parse"), None);
    }

    #[test]
    fn matches_by_id_and_class() {
        let (doc, _, card, title) = sample();
        assert_eq!(doc.query_selector("#title").expect("parse"), Some(title));
        // Document order puts the card before the title for `.card`.
        assert_eq!(doc.query_selector(".card").expect("parse"), Some(card));
        assert_eq!(doc.query_selector(".primary").expect("parse"), Some(card));
    }

    #[test]
    fn matches_compound_selectors() {
        let (doc, _, _, title) = sample();
        assert_eq!(
            doc.query_selector("h1.card#title").expect("parse"),
            Some(title)
        );
        assert_eq!(doc.query_selector("h1.primary").expect("parse"), None);
    }

    #[test]
    fn matches_descendant_chains() {
        let (doc, _, _, title) = sample();
        assert_eq!(
            doc.query_selector("body .primary h1").expect("parse"),
            Some(title)
        );
        assert_eq!(doc.query_selector("head h1").expect("parse"), None);
    }

    #[test]
    fn rejects_malformed_selectors() {
        let (doc, ..) = sample();
        assert!(doc.query_selector("").is_err());
        assert!(doc.query_selector("#").is_err());
        assert!(doc.query_selector("div..card").is_err());
        assert!(doc.query_selector("div##a").is_err());
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let (doc, _, card, _) = sample();
        assert_eq!(doc.query_selector("DIV").expect("parse"), Some(card));
    }
}
