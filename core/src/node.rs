//! Node storage primitives for the retained tree.

use core::fmt;
use std::collections::BTreeMap;

/// Identifier for a node stored inside a [`Document`](crate::Document) arena.
///
/// Identities are never reused: once a node is removed its identifier stays
/// dead for the lifetime of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Identifier of the synthetic document root.
    pub const DOCUMENT: Self = Self(0);

    /// Creates a new [`NodeId`] from the raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The retained payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The synthetic arena root. Exactly one exists per document, at slot 0.
    Document,
    /// An element with a tag name, attributes and inline styles.
    Element(ElementData),
    /// A leaf holding literal text content.
    Text(String),
    /// A leaf holding comment content.
    Comment(String),
}

impl NodeKind {
    /// Returns `true` for element nodes.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// Returns `true` for text nodes.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Tag name, attribute set and inline style set of an element node.
///
/// Attribute and style keys are unique; setting an existing key replaces its
/// value, removal deletes the key entirely.
#[derive(Debug, Clone)]
pub struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
}

impl ElementData {
    /// Creates element data with the provided tag name and no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
        }
    }

    /// Returns the element's tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Looks up an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute, replacing any previous value under the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes an attribute. Returns `true` when the attribute was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        self.attributes.remove(name).is_some()
    }

    /// Iterates over the attribute set in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Looks up an inline style property value.
    #[must_use]
    pub fn style_property(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    /// Sets an inline style property, replacing any previous value.
    pub fn set_style_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.styles.insert(name.into(), value.into());
    }

    /// Removes an inline style property. Returns `true` when it was present.
    pub fn remove_style_property(&mut self, name: &str) -> bool {
        self.styles.remove(name).is_some()
    }

    /// Iterates over the inline style set in property order.
    pub fn style_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the value of the `id` attribute, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Returns `true` when the whitespace-separated `class` attribute
    /// contains the provided class name.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|entry| entry == class))
    }
}

/// A live arena slot: payload plus the structural links to the rest of the
/// tree. The parent link is non-owning and exists for traversal only; the
/// children vector owns the subtree order.
#[derive(Debug)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) const fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            kind,
        }
    }

    /// Returns the parent identifier, if the node is attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the ordered child identifiers.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the node payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the element data when this node is an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the literal content when this node is a text or comment leaf.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(content) | NodeKind::Comment(content) => Some(content),
            _ => None,
        }
    }
}
