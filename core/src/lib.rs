//! Retained document tree for the estuary host adapter.
//!
//! The tree is an arena of nodes addressed by stable [`NodeId`] identifiers.
//! Renderers mutate it through explicit operations ([`Document::insert`],
//! [`Document::remove`], attribute and style setters) and read it back through
//! identity lookups, sibling traversal and selector queries. Identifiers are
//! never reused, so a stale id resolves to `None` instead of aliasing a newer
//! node.
//!
//! Rendering, layout and painting live elsewhere; this crate only retains
//! structure and content.

mod document;
mod error;
mod markup;
mod node;
mod query;

pub use document::Document;
pub use error::DocumentError;
pub use node::{ElementData, Node, NodeId, NodeKind};
pub use query::Selector;
