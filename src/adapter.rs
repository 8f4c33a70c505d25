//! The renderer-facing operation surface over a retained document.
//!
//! A [`HostContext`] owns the document, the listener table and the opaque
//! property store behind a single shared handle, so renderer callbacks and
//! event handlers can reach the same tree without ambient globals. The
//! [`HostAdapter`] exposes the mutation contract a diff-based renderer
//! drives: node creation, anchored insertion, text patching and prop
//! patching, with reads for anchor computation and selector lookup.

use core::fmt;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use estuary_core::{Document, DocumentError, NodeId};
use thiserror::Error;
use tracing::{debug, trace};

use crate::event::{EventKind, HandlerRef, ListenerRegistry, UiEvent};
use crate::style::{StyleDiff, StyleMap};

/// Errors reported by adapter operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The underlying document rejected the operation.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A prop value did not fit the route its key selects.
    #[error("prop `{key}` on {node} expects {expected}")]
    PropShape {
        /// The node being patched.
        node: NodeId,
        /// The offending prop key.
        key: String,
        /// What the route accepts.
        expected: &'static str,
    },
}

/// A prop value handed over by the renderer.
///
/// The variant picks the patch route together with the key: `Style` feeds
/// the style reconciler, `Handler` the listener table, `Text` the attribute
/// set, and `Opaque` the per-node property store for values the document
/// does not interpret.
#[derive(Clone)]
pub enum PropValue {
    /// A string attribute value.
    Text(String),
    /// A style declaration object.
    Style(StyleMap),
    /// An event handler closure.
    Handler(HandlerRef),
    /// An arbitrary shared value stored without interpretation.
    Opaque(Rc<dyn Any>),
}

impl PropValue {
    /// Wraps a string attribute value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Wraps an arbitrary value for opaque storage.
    pub fn opaque(value: impl Any) -> Self {
        Self::Opaque(Rc::new(value))
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Self::Style(map) => f.debug_tuple("Style").field(map).finish(),
            Self::Handler(handler) => f.debug_tuple("Handler").field(handler).finish(),
            Self::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

struct ContextInner {
    document: Document,
    listeners: ListenerRegistry,
    opaque: HashMap<NodeId, HashMap<String, PropValue>>,
    queue: VecDeque<UiEvent>,
    exit: Option<i32>,
}

/// Shared handle to the retained document and its adapter state.
///
/// Cloning is cheap and every clone refers to the same tree. The handle is
/// single-threaded; handlers invoked during dispatch may freely re-enter
/// the context through their own clone because no borrow is held across an
/// invocation.
#[derive(Clone)]
pub struct HostContext {
    inner: Rc<RefCell<ContextInner>>,
}

impl HostContext {
    /// Creates a context around the standard `html`/`head`/`body` scaffold.
    #[must_use]
    pub fn new() -> Self {
        Self::from_document(Document::new())
    }

    /// Creates a context around an existing document, usually one seeded
    /// from markup.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ContextInner {
                document,
                listeners: ListenerRegistry::new(),
                opaque: HashMap::new(),
                queue: VecDeque::new(),
                exit: None,
            })),
        }
    }

    /// Runs a closure with shared access to the document.
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.borrow().document)
    }

    /// Runs a closure with exclusive access to the document.
    pub fn with_document_mut<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.borrow_mut().document)
    }

    /// Appends an event to the delivery queue.
    pub fn push_event(&self, event: UiEvent) {
        self.inner.borrow_mut().queue.push_back(event);
    }

    /// Takes the oldest queued event, if any.
    pub fn pop_event(&self) -> Option<UiEvent> {
        self.inner.borrow_mut().queue.pop_front()
    }

    /// Returns the number of events currently queued.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Delivers an event to the handler bound on its exact target.
    ///
    /// Returns `true` when a handler ran. Events on nodes without a binding
    /// for the kind are dropped; there is no bubbling. The handler runs with
    /// no borrow held, so it may mutate the tree through the context.
    pub fn dispatch(&self, event: &UiEvent) -> bool {
        let handler = self
            .inner
            .borrow()
            .listeners
            .handler_for(event.target, event.kind);
        match handler {
            Some(handler) => {
                trace!(target = %event.target, kind = %event.kind, "dispatching event");
                handler.invoke(event);
                true
            }
            None => false,
        }
    }

    /// Records an exit request with the given status. The first request
    /// wins; later ones are ignored.
    pub fn request_exit(&self, status: i32) {
        let mut inner = self.inner.borrow_mut();
        if inner.exit.is_none() {
            debug!(status, "exit requested");
            inner.exit = Some(status);
        }
    }

    /// Returns the requested exit status, if any.
    #[must_use]
    pub fn exit_status(&self) -> Option<i32> {
        self.inner.borrow().exit
    }

    /// Returns the handler bound to `(node, kind)`, if any.
    #[must_use]
    pub fn handler_for(&self, node: NodeId, kind: EventKind) -> Option<HandlerRef> {
        self.inner.borrow().listeners.handler_for(node, kind)
    }

    /// Returns the number of live listener bindings.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Returns a node's opaque prop, if one is stored under `key`.
    #[must_use]
    pub fn opaque_prop(&self, node: NodeId, key: &str) -> Option<PropValue> {
        self.inner
            .borrow()
            .opaque
            .get(&node)
            .and_then(|props| props.get(key))
            .cloned()
    }

    fn release(&self, removed: &[NodeId]) {
        if removed.is_empty() {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        inner.listeners.release(removed);
        for node in removed {
            inner.opaque.remove(node);
        }
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("HostContext")
            .field("listeners", &inner.listeners.len())
            .field("queued_events", &inner.queue.len())
            .field("exit", &inner.exit)
            .finish_non_exhaustive()
    }
}

/// The mutation and read contract a diff-based renderer drives.
///
/// Creation never fails and returns detached nodes; attachment happens
/// through [`RendererOps::insert`]. Reads return `None` for misses so the
/// renderer can treat absence as ordinary control flow.
pub trait RendererOps {
    /// Creates a detached element with the given tag.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Creates a detached text node.
    fn create_text(&self, text: &str) -> NodeId;

    /// Creates a detached comment node.
    fn create_comment(&self, text: &str) -> NodeId;

    /// Deep-clones a subtree into fresh, detached nodes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] for stale identifiers.
    fn clone_node(&self, node: NodeId) -> Result<NodeId, AdapterError>;

    /// Attaches `node` under `parent`, before `anchor` or at the end.
    ///
    /// # Errors
    ///
    /// Propagates the document's structural checks: unknown nodes, foreign
    /// anchors and insertions that would create a cycle.
    fn insert(
        &self,
        node: NodeId,
        parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), AdapterError>;

    /// Removes a subtree and drops its listener bindings and opaque props.
    /// Removing an unknown or already removed node is a no-op.
    fn remove(&self, node: NodeId);

    /// Returns the parent of `node`, if attached.
    fn parent_node(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the sibling following `node`, if any.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// Replaces an element's children with a single text node.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAnElement`] for non-element targets.
    fn set_element_text(&self, node: NodeId, text: &str) -> Result<(), AdapterError>;

    /// Replaces the content of a text or comment node.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotATextNode`] for structural nodes.
    fn set_text(&self, node: NodeId, text: &str) -> Result<(), AdapterError>;

    /// Patches a single prop. The key and value variant select the route:
    /// `style` feeds the style reconciler, known `on*` keys the listener
    /// table, text values the attribute set, and everything else the opaque
    /// store. `prev` is the value from the previous render, `None` on the
    /// first patch; a `None` `next` clears whatever the route retains.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::PropShape`] when a value variant does not
    /// fit the route, or the document's error for unknown nodes.
    fn patch_prop(
        &self,
        node: NodeId,
        key: &str,
        prev: Option<PropValue>,
        next: Option<PropValue>,
    ) -> Result<(), AdapterError>;

    /// Marks an element with a scope identifier attribute.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAnElement`] for non-element targets.
    fn set_scope_id(&self, node: NodeId, scope_id: &str) -> Result<(), AdapterError>;

    /// Resolves the first node matching a selector.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Selector`] for malformed selector text.
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, AdapterError>;
}

/// The adapter a renderer plugs into: [`RendererOps`] over a [`HostContext`].
#[derive(Debug, Clone)]
pub struct HostAdapter {
    ctx: HostContext,
}

impl HostAdapter {
    /// Creates an adapter over the given context.
    #[must_use]
    pub const fn new(ctx: HostContext) -> Self {
        Self { ctx }
    }

    /// Returns the underlying context handle.
    #[must_use]
    pub const fn context(&self) -> &HostContext {
        &self.ctx
    }

    fn expect_style(
        node: NodeId,
        key: &str,
        value: Option<PropValue>,
    ) -> Result<Option<StyleMap>, AdapterError> {
        match value {
            Some(PropValue::Style(map)) => Ok(Some(map)),
            None => Ok(None),
            Some(_) => Err(AdapterError::PropShape {
                node,
                key: key.to_string(),
                expected: "a style map",
            }),
        }
    }

    fn patch_style(
        &self,
        node: NodeId,
        key: &str,
        prev: Option<PropValue>,
        next: Option<PropValue>,
    ) -> Result<(), AdapterError> {
        let prev = Self::expect_style(node, key, prev)?;
        let next = Self::expect_style(node, key, next)?.unwrap_or_default();

        let diff = StyleDiff::compute(prev.as_ref(), &next);
        if diff.is_empty() {
            return Ok(());
        }
        trace!(
            node = %node,
            removed = diff.removals().len(),
            updated = diff.updates().len(),
            "patching styles"
        );
        self.ctx.with_document_mut(|doc| diff.apply(doc, node))?;
        Ok(())
    }

    fn expect_handler(
        node: NodeId,
        key: &str,
        value: Option<PropValue>,
    ) -> Result<Option<HandlerRef>, AdapterError> {
        match value {
            Some(PropValue::Handler(handler)) => Ok(Some(handler)),
            None => Ok(None),
            Some(_) => Err(AdapterError::PropShape {
                node,
                key: key.to_string(),
                expected: "a handler",
            }),
        }
    }

    fn patch_listener(
        &self,
        node: NodeId,
        kind: EventKind,
        key: &str,
        prev: Option<PropValue>,
        next: Option<PropValue>,
    ) -> Result<(), AdapterError> {
        let prev = Self::expect_handler(node, key, prev)?;
        let next = Self::expect_handler(node, key, next)?;

        let mut inner = self.ctx.inner.borrow_mut();
        if inner.document.node(node).is_none() {
            return Err(DocumentError::NodeNotFound(node).into());
        }
        inner.listeners.reconcile(node, kind, prev.as_ref(), next);
        Ok(())
    }

    fn patch_other(
        &self,
        node: NodeId,
        key: &str,
        value: Option<PropValue>,
    ) -> Result<(), AdapterError> {
        match value {
            // An empty string is a falsy attribute and clears it.
            Some(PropValue::Text(text)) if text.is_empty() => {
                self.ctx.with_document_mut(|doc| doc.remove_attribute(node, key))?;
            }
            Some(PropValue::Text(text)) => {
                self.ctx
                    .with_document_mut(|doc| doc.set_attribute(node, key, text))?;
            }
            Some(value) => {
                let mut inner = self.ctx.inner.borrow_mut();
                if inner.document.node(node).is_none() {
                    return Err(DocumentError::NodeNotFound(node).into());
                }
                inner
                    .opaque
                    .entry(node)
                    .or_default()
                    .insert(key.to_string(), value);
            }
            None => {
                let mut inner = self.ctx.inner.borrow_mut();
                if let Some(props) = inner.opaque.get_mut(&node) {
                    props.remove(key);
                    if props.is_empty() {
                        inner.opaque.remove(&node);
                    }
                }
                let _ = inner.document.remove_attribute(node, key)?;
            }
        }
        Ok(())
    }
}

impl RendererOps for HostAdapter {
    fn create_element(&self, tag: &str) -> NodeId {
        self.ctx
            .with_document_mut(|doc| doc.create_element(tag, &[]))
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.ctx.with_document_mut(|doc| doc.create_text(text))
    }

    fn create_comment(&self, text: &str) -> NodeId {
        self.ctx.with_document_mut(|doc| doc.create_comment(text))
    }

    fn clone_node(&self, node: NodeId) -> Result<NodeId, AdapterError> {
        self.ctx
            .with_document_mut(|doc| doc.deep_clone(node))
            .ok_or_else(|| DocumentError::NodeNotFound(node).into())
    }

    fn insert(
        &self,
        node: NodeId,
        parent: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), AdapterError> {
        self.ctx
            .with_document_mut(|doc| doc.insert(node, parent, anchor))?;
        Ok(())
    }

    fn remove(&self, node: NodeId) {
        let removed = self.ctx.with_document_mut(|doc| doc.remove(node));
        if !removed.is_empty() {
            debug!(node = %node, subtree = removed.len(), "removed subtree");
        }
        self.ctx.release(&removed);
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.ctx.with_document(|doc| doc.parent(node))
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.ctx.with_document(|doc| doc.next_sibling(node))
    }

    fn set_element_text(&self, node: NodeId, text: &str) -> Result<(), AdapterError> {
        let removed = self
            .ctx
            .with_document_mut(|doc| doc.set_element_text(node, text))?;
        self.ctx.release(&removed);
        Ok(())
    }

    fn set_text(&self, node: NodeId, text: &str) -> Result<(), AdapterError> {
        self.ctx.with_document_mut(|doc| doc.set_text(node, text))?;
        Ok(())
    }

    fn patch_prop(
        &self,
        node: NodeId,
        key: &str,
        prev: Option<PropValue>,
        next: Option<PropValue>,
    ) -> Result<(), AdapterError> {
        if key == "style" {
            return self.patch_style(node, key, prev, next);
        }
        if let Some(kind) = EventKind::from_prop_key(key) {
            return self.patch_listener(node, kind, key, prev, next);
        }
        self.patch_other(node, key, next)
    }

    fn set_scope_id(&self, node: NodeId, scope_id: &str) -> Result<(), AdapterError> {
        self.ctx
            .with_document_mut(|doc| doc.set_attribute(node, scope_id, ""))?;
        Ok(())
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, AdapterError> {
        Ok(self.ctx.with_document(|doc| doc.query_selector(selector))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventPayload;
    use std::cell::Cell;

    fn adapter() -> (HostAdapter, NodeId) {
        let ctx = HostContext::new();
        let adapter = HostAdapter::new(ctx);
        let body = adapter
            .query_selector("body")
            .expect("parse")
            .expect("body");
        (adapter, body)
    }

    fn style_of(pairs: &[(&str, &str)]) -> PropValue {
        PropValue::Style(pairs.iter().copied().collect())
    }

    #[test]
    fn style_patch_removes_stale_properties() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");

        adapter
            .patch_prop(
                node,
                "style",
                None,
                Some(style_of(&[("color", "red"), ("width", "10px")])),
            )
            .expect("patch");
        adapter
            .patch_prop(
                node,
                "style",
                Some(style_of(&[("color", "red"), ("width", "10px")])),
                Some(style_of(&[("color", "red"), ("height", "4px")])),
            )
            .expect("patch");

        adapter.context().with_document(|doc| {
            assert_eq!(doc.style_property(node, "color"), Some("red"));
            assert_eq!(doc.style_property(node, "height"), Some("4px"));
            assert_eq!(doc.style_property(node, "width"), None);
        });
    }

    #[test]
    fn clearing_style_drops_every_property() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");

        adapter
            .patch_prop(node, "style", None, Some(style_of(&[("color", "red")])))
            .expect("patch");
        adapter
            .patch_prop(node, "style", Some(style_of(&[("color", "red")])), None)
            .expect("patch");

        adapter.context().with_document(|doc| {
            assert_eq!(doc.style_property(node, "color"), None);
        });
    }

    #[test]
    fn style_key_rejects_other_variants() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");

        let err = adapter
            .patch_prop(node, "style", None, Some(PropValue::text("color: red")))
            .unwrap_err();
        assert!(matches!(err, AdapterError::PropShape { .. }));
    }

    #[test]
    fn text_props_become_attributes() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("a");
        adapter.insert(node, body, None).expect("insert");

        adapter
            .patch_prop(node, "href", None, Some(PropValue::text("/home")))
            .expect("patch");
        adapter.context().with_document(|doc| {
            assert_eq!(doc.attribute(node, "href"), Some("/home"));
        });

        // Empty string and None both clear.
        adapter
            .patch_prop(
                node,
                "href",
                Some(PropValue::text("/home")),
                Some(PropValue::text("")),
            )
            .expect("patch");
        adapter.context().with_document(|doc| {
            assert_eq!(doc.attribute(node, "href"), None);
        });
    }

    #[test]
    fn replacing_a_listener_silences_the_old_one() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("button");
        adapter.insert(node, body, None).expect("insert");

        let first_hits = Rc::new(Cell::new(0));
        let second_hits = Rc::new(Cell::new(0));
        let first = {
            let hits = Rc::clone(&first_hits);
            HandlerRef::new(move |_| hits.set(hits.get() + 1))
        };
        let second = {
            let hits = Rc::clone(&second_hits);
            HandlerRef::new(move |_| hits.set(hits.get() + 1))
        };

        adapter
            .patch_prop(node, "onClick", None, Some(PropValue::Handler(first.clone())))
            .expect("patch");
        adapter
            .patch_prop(
                node,
                "onClick",
                Some(PropValue::Handler(first)),
                Some(PropValue::Handler(second)),
            )
            .expect("patch");

        let event = UiEvent::new(node, EventKind::Click, EventPayload::None);
        assert!(adapter.context().dispatch(&event));
        assert_eq!(first_hits.get(), 0);
        assert_eq!(second_hits.get(), 1);
        assert_eq!(adapter.context().listener_count(), 1);
    }

    #[test]
    fn unknown_on_keys_fall_through_to_the_opaque_store() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");

        let handler = HandlerRef::new(|_| {});
        adapter
            .patch_prop(node, "onFocus", None, Some(PropValue::Handler(handler)))
            .expect("patch");

        assert_eq!(adapter.context().listener_count(), 0);
        assert!(adapter.context().opaque_prop(node, "onFocus").is_some());
    }

    #[test]
    fn opaque_props_round_trip_and_clear() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("canvas");
        adapter.insert(node, body, None).expect("insert");

        adapter
            .patch_prop(node, "renderer", None, Some(PropValue::opaque(42_u32)))
            .expect("patch");
        let stored = adapter
            .context()
            .opaque_prop(node, "renderer")
            .expect("stored");
        match &stored {
            PropValue::Opaque(value) => {
                assert_eq!(value.downcast_ref::<u32>(), Some(&42));
            }
            other => panic!("unexpected variant {other:?}"),
        }

        adapter
            .patch_prop(node, "renderer", Some(stored), None)
            .expect("patch");
        assert!(adapter.context().opaque_prop(node, "renderer").is_none());
    }

    #[test]
    fn remove_releases_listeners_and_opaque_props() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        let child = adapter.create_element("button");
        adapter.insert(node, body, None).expect("insert");
        adapter.insert(child, node, None).expect("insert");

        adapter
            .patch_prop(
                child,
                "onClick",
                None,
                Some(PropValue::Handler(HandlerRef::new(|_| {}))),
            )
            .expect("patch");
        adapter
            .patch_prop(node, "state", None, Some(PropValue::opaque("live")))
            .expect("patch");

        adapter.remove(node);
        assert_eq!(adapter.context().listener_count(), 0);
        assert!(adapter.context().opaque_prop(node, "state").is_none());
        adapter
            .context()
            .with_document(|doc| assert!(doc.node(node).is_none()));
    }

    #[test]
    fn set_element_text_releases_replaced_children() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        let child = adapter.create_element("button");
        adapter.insert(node, body, None).expect("insert");
        adapter.insert(child, node, None).expect("insert");
        adapter
            .patch_prop(
                child,
                "onClick",
                None,
                Some(PropValue::Handler(HandlerRef::new(|_| {}))),
            )
            .expect("patch");

        adapter.set_element_text(node, "replaced").expect("set text");
        assert_eq!(adapter.context().listener_count(), 0);
    }

    #[test]
    fn scope_ids_become_marker_attributes() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");

        adapter.set_scope_id(node, "data-v-7ba5bd90").expect("scope");
        adapter.context().with_document(|doc| {
            assert_eq!(doc.attribute(node, "data-v-7ba5bd90"), Some(""));
        });
    }

    #[test]
    fn cloning_copies_structure_but_not_listeners() {
        let (adapter, body) = adapter();
        let node = adapter.create_element("div");
        adapter.insert(node, body, None).expect("insert");
        adapter
            .patch_prop(node, "id", None, Some(PropValue::text("card")))
            .expect("patch");
        adapter
            .patch_prop(
                node,
                "onClick",
                None,
                Some(PropValue::Handler(HandlerRef::new(|_| {}))),
            )
            .expect("patch");

        let copy = adapter.clone_node(node).expect("clone");
        assert_ne!(copy, node);
        adapter.context().with_document(|doc| {
            assert_eq!(doc.attribute(copy, "id"), Some("card"));
            assert_eq!(doc.parent(copy), None);
        });
        assert!(
            adapter
                .context()
                .handler_for(copy, EventKind::Click)
                .is_none()
        );
    }

    #[test]
    fn clone_of_a_stale_id_fails() {
        let (adapter, _) = adapter();
        let node = adapter.create_element("div");
        adapter.remove(node);
        let err = adapter.clone_node(node).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Document(DocumentError::NodeNotFound(_))
        ));
    }

    #[test]
    fn handlers_may_mutate_the_tree_during_dispatch() {
        let ctx = HostContext::new();
        let adapter = HostAdapter::new(ctx.clone());
        let body = adapter
            .query_selector("body")
            .expect("parse")
            .expect("body");
        let button = adapter.create_element("button");
        adapter.insert(button, body, None).expect("insert");

        let handler_ctx = ctx.clone();
        let handler = HandlerRef::new(move |event| {
            let inner = HostAdapter::new(handler_ctx.clone());
            let label = inner.create_text("clicked");
            inner
                .insert(label, event.target, None)
                .expect("insert from handler");
        });
        adapter
            .patch_prop(button, "onClick", None, Some(PropValue::Handler(handler)))
            .expect("patch");

        let event = UiEvent::new(button, EventKind::Click, EventPayload::None);
        assert!(ctx.dispatch(&event));
        ctx.with_document(|doc| assert_eq!(doc.children(button).len(), 1));
    }
}
