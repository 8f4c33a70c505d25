//! Event kinds, handler references and listener reconciliation.
//!
//! A node carries at most one handler per event kind. Renderers replace
//! handlers wholesale on update; reconciliation keeps the binding table in
//! step without ever leaving two handlers racing for the same slot.

use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;

use estuary_core::NodeId;
use tracing::trace;

/// The input events a document node can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A pointer click.
    Click,
    /// Pointer movement over the node.
    MouseMove,
    /// A pointer button press.
    MouseDown,
    /// A pointer button release.
    MouseUp,
    /// A character-producing key press.
    KeyPress,
    /// A key going down.
    KeyDown,
    /// A key coming up.
    KeyUp,
    /// A value change on an editable node.
    Input,
}

impl EventKind {
    const ALL: &[Self] = &[
        Self::Click,
        Self::MouseMove,
        Self::MouseDown,
        Self::MouseUp,
        Self::KeyPress,
        Self::KeyDown,
        Self::KeyUp,
        Self::Input,
    ];

    /// Returns the lowercase event name (`click`, `mousemove`, …).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseMove => "mousemove",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::KeyPress => "keypress",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::Input => "input",
        }
    }

    /// Resolves a lowercase event name back to its kind.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Resolves a renderer prop key (`onClick`, `onMousedown`, …) to its
    /// kind. The part after `on` is matched case-insensitively, so both
    /// `onMouseMove` and `onMousemove` resolve. Keys without the `on` prefix
    /// or naming an unknown event yield `None`.
    #[must_use]
    pub fn from_prop_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix("on")?;
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data carried alongside an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventPayload {
    /// Pointer coordinates in document space.
    Mouse {
        /// Horizontal position.
        x: f64,
        /// Vertical position.
        y: f64,
    },
    /// The logical key that was pressed or released.
    Key {
        /// Key name, `Enter`, `a` and similar.
        key: String,
    },
    /// The current value of an editable node.
    Input {
        /// The node's full value after the edit.
        value: String,
    },
    /// No extra data.
    #[default]
    None,
}

/// An event delivered to a single target node.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEvent {
    /// The node the event is addressed to.
    pub target: NodeId,
    /// What happened.
    pub kind: EventKind,
    /// Event-specific data.
    pub payload: EventPayload,
}

impl UiEvent {
    /// Creates an event for `target`.
    #[must_use]
    pub const fn new(target: NodeId, kind: EventKind, payload: EventPayload) -> Self {
        Self {
            target,
            kind,
            payload,
        }
    }
}

/// A shared, cheaply clonable handler closure.
///
/// Equality is reference identity: two references are the same handler only
/// when they point at the same allocation. Cloning a [`HandlerRef`] never
/// copies the closure.
#[derive(Clone)]
pub struct HandlerRef(Rc<dyn Fn(&UiEvent)>);

impl HandlerRef {
    /// Wraps a closure into a shared handler reference.
    pub fn new(handler: impl Fn(&UiEvent) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Returns `true` when both references point at the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Invokes the handler.
    pub fn invoke(&self, event: &UiEvent) {
        (self.0)(event);
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef")
            .field(&Rc::as_ptr(&self.0))
            .finish()
    }
}

/// The listener binding table: at most one handler per `(node, kind)` slot.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    bindings: HashMap<(NodeId, EventKind), HandlerRef>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles the slot for `(node, kind)` from `prev` toward `next`.
    ///
    /// A reference-equal `prev`/`next` pair is a no-op, so re-renders that
    /// keep the same closure never rebind. A differing handler is unbound
    /// before the next one is bound, which keeps the slot from ever holding
    /// two handlers. An absent `next` only unbinds.
    pub fn reconcile(
        &mut self,
        node: NodeId,
        kind: EventKind,
        prev: Option<&HandlerRef>,
        next: Option<HandlerRef>,
    ) {
        let slot = (node, kind);
        match (prev, next) {
            (Some(prev), Some(next)) if prev.ptr_eq(&next) => {}
            (_, Some(next)) => {
                if self.bindings.remove(&slot).is_some() {
                    trace!(node = %node, kind = %kind, "replacing listener");
                } else {
                    trace!(node = %node, kind = %kind, "binding listener");
                }
                self.bindings.insert(slot, next);
            }
            (_, None) => {
                if self.bindings.remove(&slot).is_some() {
                    trace!(node = %node, kind = %kind, "unbinding listener");
                }
            }
        }
    }

    /// Returns the handler bound to `(node, kind)`, if any.
    #[must_use]
    pub fn handler_for(&self, node: NodeId, kind: EventKind) -> Option<HandlerRef> {
        self.bindings.get(&(node, kind)).cloned()
    }

    /// Drops every binding owned by the listed nodes.
    pub fn release(&mut self, nodes: &[NodeId]) {
        self.bindings.retain(|(node, _), _| !nodes.contains(node));
    }

    /// Returns the number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
