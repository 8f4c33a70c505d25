#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod event;
pub mod logging;
pub mod shell;
pub mod style;

#[doc(inline)]
pub use adapter::{AdapterError, HostAdapter, HostContext, PropValue, RendererOps};
#[doc(inline)]
pub use shell::{PumpStatus, Shell, ShellBuilder, ShellError};

pub use estuary_core::{Document, DocumentError, NodeId, Selector};

pub mod prelude {
    //! The types most renderer integrations need, importable in one line.

    pub use crate::adapter::{AdapterError, HostAdapter, HostContext, PropValue, RendererOps};
    pub use crate::event::{EventKind, EventPayload, HandlerRef, UiEvent};
    pub use crate::shell::{PumpStatus, Shell, ShellBuilder, ShellError};
    pub use crate::style::{StyleDiff, StyleMap};
    pub use estuary_core::{Document, DocumentError, NodeId};
}
