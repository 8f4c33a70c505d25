//! The cooperative frame pump driving a host context.
//!
//! A [`Shell`] owns a [`HostContext`] and turns queued input events into
//! handler invocations, one bounded batch per pump. Embedders either call
//! [`Shell::pump`] from their own frame loop or hand control to
//! [`Shell::run`], which sleeps between ticks until an exit is requested.

use std::thread;
use std::time::Duration;

use estuary_core::{Document, DocumentError};
use thiserror::Error;
use tracing::{debug, info};

use crate::adapter::{HostAdapter, HostContext};

const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Errors reported while assembling a shell.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The seed markup was rejected by the document loader.
    #[error("seed markup was rejected: {0}")]
    Markup(#[from] DocumentError),
}

/// What the embedder should do after a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// Keep pumping; no exit has been requested.
    Continue,
    /// Stop the loop and report the given process status.
    Exit(i32),
}

/// A frame-driven event loop over a [`HostContext`].
#[derive(Debug)]
pub struct Shell {
    ctx: HostContext,
    tick: Duration,
}

impl Shell {
    /// Starts building a shell.
    #[must_use]
    pub fn builder() -> ShellBuilder {
        ShellBuilder::new()
    }

    /// Returns the context handle the shell pumps.
    #[must_use]
    pub const fn context(&self) -> &HostContext {
        &self.ctx
    }

    /// Returns an adapter over the shell's context for renderer wiring.
    #[must_use]
    pub fn adapter(&self) -> HostAdapter {
        HostAdapter::new(self.ctx.clone())
    }

    /// Dispatches the events queued at entry, in arrival order, then reports
    /// whether an exit was requested.
    ///
    /// Events pushed by handlers during this pump stay queued for the next
    /// one, so a handler feeding the queue cannot starve the frame.
    pub fn pump(&self) -> PumpStatus {
        let pending = self.ctx.pending_events();
        for _ in 0..pending {
            let Some(event) = self.ctx.pop_event() else {
                break;
            };
            self.ctx.dispatch(&event);
            if self.ctx.exit_status().is_some() {
                break;
            }
        }
        self.ctx
            .exit_status()
            .map_or(PumpStatus::Continue, |status| {
                debug!(status, "pump observed exit request");
                PumpStatus::Exit(status)
            })
    }

    /// Pumps until an exit is requested, sleeping one tick between frames,
    /// and returns the requested status.
    pub fn run(&self) -> i32 {
        info!(tick = ?self.tick, "shell running");
        loop {
            match self.pump() {
                PumpStatus::Exit(status) => {
                    info!(status, "shell exiting");
                    return status;
                }
                PumpStatus::Continue => thread::sleep(self.tick),
            }
        }
    }
}

/// Builder assembling a [`Shell`] from seed markup and stylesheets.
#[derive(Debug, Default)]
pub struct ShellBuilder {
    markup: Option<String>,
    stylesheets: Vec<String>,
    tick: Option<Duration>,
}

impl ShellBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the document from a markup string instead of the bare
    /// scaffold.
    #[must_use]
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Appends a stylesheet retained alongside the document.
    #[must_use]
    pub fn with_stylesheet(mut self, stylesheet: impl Into<String>) -> Self {
        self.stylesheets.push(stylesheet.into());
        self
    }

    /// Overrides the sleep between frames in [`Shell::run`].
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Consumes the builder and produces a [`Shell`].
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Markup`] when the seed markup cannot be
    /// parsed.
    pub fn build(self) -> Result<Shell, ShellError> {
        let mut document = match self.markup {
            Some(markup) => Document::from_markup(&markup)?,
            None => Document::new(),
        };
        for stylesheet in self.stylesheets {
            document.push_stylesheet(stylesheet);
        }
        Ok(Shell {
            ctx: HostContext::from_document(document),
            tick: self.tick.unwrap_or(DEFAULT_TICK),
        })
    }
}
