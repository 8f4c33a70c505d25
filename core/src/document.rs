//! The arena-backed retained document tree.

use core::fmt::Write as _;

use tracing::trace;

use crate::{
    DocumentError,
    node::{ElementData, Node, NodeId, NodeKind},
};

/// A retained, mutable document tree with identity-stable nodes.
///
/// Nodes live in an arena of tombstoned slots: a [`NodeId`] resolves to the
/// same logical node for the node's whole lifetime and to `None` forever
/// after removal. Slot 0 is the synthetic document root. Children are owned
/// by their parent in render order; parent links are non-owning and exist
/// for traversal only.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    stylesheets: Vec<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document seeded with the default `html`/`head`/`body`
    /// scaffold, so bootstrap queries such as `body` resolve before any
    /// markup has been loaded.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.create_element("html", &[]);
        let head = doc.create_element("head", &[]);
        let body = doc.create_element("body", &[("id", "body")]);
        doc.append(html, NodeId::DOCUMENT);
        doc.append(head, html);
        doc.append(body, html);
        doc
    }

    /// Creates a document containing only the synthetic root.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: vec![Some(Node::new(NodeKind::Document, None))],
            stylesheets: Vec::new(),
        }
    }

    /// Returns the identifier of the synthetic document root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Returns the number of live nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` when only the synthetic root is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    // ------------------------------------------------------------------
    // Identity store
    // ------------------------------------------------------------------

    /// Resolves a node by identity.
    ///
    /// Repeated lookups of a live identity denote the same arena slot;
    /// unknown or removed identities yield `None`, never a panic.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Resolves a node by identity for mutation.
    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Returns `true` when the identity resolves to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Allocates a detached element node. Attributes are applied at
    /// creation; the node joins the tree only through [`Self::insert`].
    pub fn create_element(&mut self, tag: impl Into<String>, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attribute(*name, *value);
        }
        let id = self.alloc(NodeKind::Element(data));
        trace!(node = %id, "created element");
        id
    }

    /// Allocates a detached text node holding the literal content.
    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        let id = self.alloc(NodeKind::Text(content.into()));
        trace!(node = %id, "created text node");
        id
    }

    /// Allocates a detached comment node holding the literal content.
    pub fn create_comment(&mut self, content: impl Into<String>) -> NodeId {
        let id = self.alloc(NodeKind::Comment(content.into()));
        trace!(node = %id, "created comment node");
        id
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Some(Node::new(kind, None)));
        id
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Inserts `node` under `parent`.
    ///
    /// Without an anchor the node is appended as the last child. With an
    /// anchor the node lands immediately before it; the anchor must
    /// currently be a child of `parent`. A node that already has a parent
    /// is detached first, so no explicit remove call is required when
    /// moving nodes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] when `node` or `parent` do
    /// not resolve, [`DocumentError::CircularInsertion`] when `parent` lies
    /// inside `node`'s subtree, and [`DocumentError::InvalidAnchor`] when
    /// the anchor is not a child of `parent`.
    pub fn insert(
        &mut self,
        node: NodeId,
        parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), DocumentError> {
        if !self.contains(node) {
            return Err(DocumentError::NodeNotFound(node));
        }
        if !self.contains(parent) {
            return Err(DocumentError::NodeNotFound(parent));
        }
        if node == parent || self.is_ancestor(node, parent) {
            return Err(DocumentError::CircularInsertion(node));
        }

        self.detach(node);

        let position = match anchor {
            Some(anchor) => {
                let children = self.children(parent);
                children
                    .iter()
                    .position(|child| *child == anchor)
                    .ok_or(DocumentError::InvalidAnchor { parent, anchor })?
            }
            None => self.children(parent).len(),
        };

        if let Some(entry) = self.node_mut(parent) {
            entry.children.insert(position, node);
        }
        if let Some(entry) = self.node_mut(node) {
            entry.parent = Some(parent);
        }
        trace!(node = %node, parent = %parent, position, "inserted node");
        Ok(())
    }

    /// Appends a known-live node; used by the scaffold and markup loader.
    pub(crate) fn append(&mut self, node: NodeId, parent: NodeId) {
        if let Some(entry) = self.node_mut(parent) {
            entry.children.push(node);
        }
        if let Some(entry) = self.node_mut(node) {
            entry.parent = Some(parent);
        }
    }

    /// Returns `true` when `ancestor` lies on the parent chain of `node`,
    /// or is the node itself.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(Node::parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(Node::parent) else {
            return;
        };
        if let Some(entry) = self.node_mut(parent) {
            entry.children.retain(|child| *child != node);
        }
        if let Some(entry) = self.node_mut(node) {
            entry.parent = None;
        }
    }

    /// Detaches `node` and tombstones its whole subtree. All removed
    /// identities become unresolvable. Idempotent: removing an already
    /// removed node does nothing.
    ///
    /// Returns the identities that were removed so callers can release any
    /// per-node state of their own (listener bindings, opaque properties).
    pub fn remove(&mut self, node: NodeId) -> Vec<NodeId> {
        if !self.contains(node) {
            return Vec::new();
        }
        self.detach(node);

        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.nodes.get_mut(id.index()).and_then(Option::take) {
                stack.extend(entry.children.iter().copied());
                removed.push(id);
            }
        }
        trace!(node = %node, count = removed.len(), "removed subtree");
        removed
    }

    /// Produces a deep structural copy of `node` with fresh identities:
    /// tag, attributes, inline styles and children are copied recursively.
    /// The copy is detached. Returns `None` when `node` does not resolve or
    /// is the synthetic root.
    ///
    /// Listener bindings are adapter-level state and are deliberately not
    /// part of the copy.
    pub fn deep_clone(&mut self, node: NodeId) -> Option<NodeId> {
        let kind = match &self.node(node)?.kind {
            NodeKind::Document => return None,
            kind => kind.clone(),
        };
        let children = self.children(node).to_vec();

        let clone = self.alloc(kind);
        for child in children {
            if let Some(child_clone) = self.deep_clone(child) {
                self.append(child_clone, clone);
            }
        }
        trace!(node = %node, clone = %clone, "deep-cloned subtree");
        Some(clone)
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Returns the parent of `node`, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(Node::parent)
    }

    /// Returns the ordered children of `node`. Unknown identities yield an
    /// empty slice.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map_or(&[], Node::children)
    }

    /// Returns the sibling immediately after `node`, if any.
    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_at_offset(node, 1)
    }

    /// Returns the sibling immediately before `node`, if any.
    #[must_use]
    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling_at_offset(node, -1)
    }

    fn sibling_at_offset(&self, node: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|child| *child == node)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Replaces all children of an element with a single text node holding
    /// `text`.
    ///
    /// Returns the identities removed in the process, so callers can
    /// release per-node state for the dropped children.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] when `node` does not resolve
    /// and [`DocumentError::NotAnElement`] when it is not an element.
    pub fn set_element_text(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
    ) -> Result<Vec<NodeId>, DocumentError> {
        let entry = self
            .node(node)
            .ok_or(DocumentError::NodeNotFound(node))?;
        if !entry.kind().is_element() {
            return Err(DocumentError::NotAnElement(node));
        }

        let mut removed = Vec::new();
        for child in self.children(node).to_vec() {
            removed.extend(self.remove(child));
        }
        let text_node = self.create_text(text);
        self.append(text_node, node);
        Ok(removed)
    }

    /// Replaces the literal content of a text or comment node.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] when `node` does not resolve
    /// and [`DocumentError::NotATextNode`] when it holds no literal text.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), DocumentError> {
        let entry = self
            .node_mut(node)
            .ok_or(DocumentError::NodeNotFound(node))?;
        match &mut entry.kind {
            NodeKind::Text(content) | NodeKind::Comment(content) => {
                *content = text.into();
                Ok(())
            }
            _ => Err(DocumentError::NotATextNode(node)),
        }
    }

    // ------------------------------------------------------------------
    // Attributes and styles
    // ------------------------------------------------------------------

    /// Sets an attribute on an element, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] or
    /// [`DocumentError::NotAnElement`] on structural misuse.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        self.element_mut(node)?.set_attribute(name, value);
        Ok(())
    }

    /// Removes an attribute from an element. Returns `true` when the
    /// attribute was present.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] or
    /// [`DocumentError::NotAnElement`] on structural misuse.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<bool, DocumentError> {
        Ok(self.element_mut(node)?.remove_attribute(name))
    }

    /// Looks up an attribute value on an element. Non-elements and unknown
    /// identities yield `None`.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.as_element()?.attribute(name)
    }

    /// Sets an inline style property on an element.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] or
    /// [`DocumentError::NotAnElement`] on structural misuse.
    pub fn set_style_property(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DocumentError> {
        self.element_mut(node)?.set_style_property(name, value);
        Ok(())
    }

    /// Removes an inline style property from an element. Returns `true`
    /// when the property was present.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] or
    /// [`DocumentError::NotAnElement`] on structural misuse.
    pub fn remove_style_property(
        &mut self,
        node: NodeId,
        name: &str,
    ) -> Result<bool, DocumentError> {
        Ok(self.element_mut(node)?.remove_style_property(name))
    }

    /// Looks up an inline style property value on an element.
    #[must_use]
    pub fn style_property(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?.as_element()?.style_property(name)
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut ElementData, DocumentError> {
        self.node_mut(node)
            .ok_or(DocumentError::NodeNotFound(node))?
            .as_element_mut()
            .ok_or(DocumentError::NotAnElement(node))
    }

    // ------------------------------------------------------------------
    // Stylesheets
    // ------------------------------------------------------------------

    /// Stores stylesheet source text on the document. The text is retained
    /// verbatim for the layout engine; nothing here interprets it.
    pub fn push_stylesheet(&mut self, source: impl Into<String>) {
        self.stylesheets.push(source.into());
    }

    /// Returns the stylesheet sources in registration order.
    #[must_use]
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    // ------------------------------------------------------------------
    // Debugging
    // ------------------------------------------------------------------

    /// Renders the subtree under `node` as an indented listing, one node
    /// per line. Useful in tests and debug logging.
    #[must_use]
    pub fn fmt_tree(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.fmt_tree_into(&mut out, node, 0);
        out
    }

    fn fmt_tree_into(&self, out: &mut String, node: NodeId, depth: usize) {
        let Some(entry) = self.node(node) else {
            return;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        match entry.kind() {
            NodeKind::Document => out.push_str("#document"),
            NodeKind::Element(data) => {
                let _ = write!(out, "<{}", data.tag());
                for (name, value) in data.attributes() {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
            }
            NodeKind::Text(content) => {
                let _ = write!(out, "{content:?}");
            }
            NodeKind::Comment(content) => {
                let _ = write!(out, "<!-- {content} -->");
            }
        }
        out.push('\n');
        for child in entry.children() {
            self.fmt_tree_into(out, *child, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached_element(doc: &mut Document, tag: &str) -> NodeId {
        let id = doc.create_element(tag, &[]);
        doc.insert(id, doc.root(), None).expect("insert under root");
        id
    }

    #[test]
    fn identity_lookups_are_stable() {
        let mut doc = Document::empty();
        let id = doc.create_element("div", &[("scope-id", "123")]);
        let first = doc.node(id).expect("node resolves") as *const Node;
        let second = doc.node(id).expect("node resolves") as *const Node;
        assert_eq!(first, second);
    }

    #[test]
    fn insert_without_anchor_appends() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "ul");
        let a = doc.create_element("li", &[]);
        let b = doc.create_element("li", &[]);
        doc.insert(a, parent, None).expect("append a");
        doc.insert(b, parent, None).expect("append b");
        assert_eq!(doc.children(parent), &[a, b]);
    }

    #[test]
    fn insert_with_anchor_lands_immediately_before() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "ul");
        let a = doc.create_element("li", &[]);
        let c = doc.create_element("li", &[]);
        doc.insert(a, parent, None).expect("append a");
        doc.insert(c, parent, None).expect("append c");

        let b = doc.create_element("li", &[]);
        doc.insert(b, parent, Some(c)).expect("insert before c");
        assert_eq!(doc.children(parent), &[a, b, c]);
    }

    #[test]
    fn insert_detaches_from_previous_parent() {
        let mut doc = Document::empty();
        let first = attached_element(&mut doc, "div");
        let second = attached_element(&mut doc, "div");
        let child = doc.create_element("span", &[]);
        doc.insert(child, first, None).expect("insert under first");
        doc.insert(child, second, None).expect("move under second");

        assert!(doc.children(first).is_empty());
        assert_eq!(doc.children(second), &[child]);
        assert_eq!(doc.parent(child), Some(second));
    }

    #[test]
    fn insert_rejects_foreign_anchor() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "div");
        let other = attached_element(&mut doc, "div");
        let anchor = doc.create_element("span", &[]);
        doc.insert(anchor, other, None).expect("anchor under other");

        let node = doc.create_element("span", &[]);
        let err = doc.insert(node, parent, Some(anchor)).unwrap_err();
        assert_eq!(err, DocumentError::InvalidAnchor { parent, anchor });
    }

    #[test]
    fn insert_rejects_cycles() {
        let mut doc = Document::empty();
        let outer = attached_element(&mut doc, "div");
        let inner = doc.create_element("div", &[]);
        doc.insert(inner, outer, None).expect("nest inner");

        let err = doc.insert(outer, inner, None).unwrap_err();
        assert_eq!(err, DocumentError::CircularInsertion(outer));
    }

    #[test]
    fn removal_is_final_and_recursive() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "div");
        let child = doc.create_element("span", &[]);
        let grandchild = doc.create_text("hi");
        doc.insert(child, parent, None).expect("insert child");
        doc.insert(grandchild, child, None).expect("insert grandchild");

        let removed = doc.remove(child);
        assert_eq!(removed.len(), 2);
        assert!(!doc.contains(child));
        assert!(!doc.contains(grandchild));
        assert!(doc.children(parent).is_empty());

        // Idempotent on an already removed node.
        assert!(doc.remove(child).is_empty());
    }

    #[test]
    fn clone_copies_structure_with_fresh_identities() {
        let mut doc = Document::empty();
        let original = doc.create_element("div", &[("scope-id", "123")]);
        doc.set_style_property(original, "color", "red")
            .expect("style applies");
        let child = doc.create_text("hello");
        doc.insert(original, doc.root(), None).expect("attach");
        doc.insert(child, original, None).expect("insert child");

        let clone = doc.deep_clone(original).expect("clone succeeds");
        assert_ne!(clone, original);
        assert_eq!(doc.attribute(clone, "scope-id"), Some("123"));
        assert_eq!(doc.style_property(clone, "color"), Some("red"));
        assert_eq!(doc.children(clone).len(), 1);
        let cloned_child = doc.children(clone)[0];
        assert_ne!(cloned_child, child);
        assert_eq!(doc.node(cloned_child).and_then(Node::text), Some("hello"));
        // The clone starts detached.
        assert_eq!(doc.parent(clone), None);
    }

    #[test]
    fn set_element_text_replaces_all_children() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "div");
        let span = doc.create_element("span", &[]);
        let text = doc.create_text("old");
        doc.insert(span, parent, None).expect("insert span");
        doc.insert(text, parent, None).expect("insert text");

        let removed = doc.set_element_text(parent, "new").expect("set text");
        assert_eq!(removed.len(), 2);
        assert_eq!(doc.children(parent).len(), 1);
        let only = doc.children(parent)[0];
        assert_eq!(doc.node(only).and_then(Node::text), Some("new"));
        assert!(!doc.contains(span));
    }

    #[test]
    fn set_text_updates_literal_content() {
        let mut doc = Document::empty();
        let text = doc.create_text("before");
        doc.set_text(text, "after").expect("set text");
        assert_eq!(doc.node(text).and_then(Node::text), Some("after"));

        let element = doc.create_element("div", &[]);
        let err = doc.set_text(element, "nope").unwrap_err();
        assert_eq!(err, DocumentError::NotATextNode(element));
    }

    #[test]
    fn sibling_traversal() {
        let mut doc = Document::empty();
        let parent = attached_element(&mut doc, "div");
        let a = doc.create_element("i", &[]);
        let b = doc.create_element("i", &[]);
        doc.insert(a, parent, None).expect("append a");
        doc.insert(b, parent, None).expect("append b");

        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.next_sibling(b), None);
        assert_eq!(doc.previous_sibling(b), Some(a));
        assert_eq!(doc.previous_sibling(a), None);
        assert_eq!(doc.parent(a), Some(parent));
    }

    #[test]
    fn default_scaffold_has_body() {
        let doc = Document::new();
        let html = doc.children(doc.root());
        assert_eq!(html.len(), 1);
        let top = doc.node(html[0]).and_then(Node::as_element).expect("html");
        assert_eq!(top.tag(), "html");
    }

    #[test]
    fn style_removal_leaves_no_residue() {
        let mut doc = Document::empty();
        let node = doc.create_element("div", &[]);
        doc.set_style_property(node, "width", "1px").expect("set");
        assert!(doc.remove_style_property(node, "width").expect("remove"));
        assert_eq!(doc.style_property(node, "width"), None);
        assert!(!doc.remove_style_property(node, "width").expect("second"));
    }

    #[test]
    fn fmt_tree_lists_nodes_in_order() {
        let mut doc = Document::empty();
        let div = doc.create_element("div", &[("id", "app")]);
        let text = doc.create_text("hi");
        doc.insert(div, doc.root(), None).expect("attach");
        doc.insert(text, div, None).expect("insert text");

        let dump = doc.fmt_tree(doc.root());
        assert_eq!(dump, "#document\n  <div id=\"app\">\n    \"hi\"\n");
    }
}
