//! Presentation surfaces for the override prompt.
//!
//! The workflow talks to a [`PresentationSurface`] and never knows which
//! one it has. Two exist: a graphical dialog and a text console. The
//! dialog is only chosen when it is actually usable; otherwise the console
//! takes over with the same contract.

use tracing::info;

use crate::error::MetagateError;
use crate::gate::console::ConsoleSurface;
use crate::gate::dialog::DialogSurface;
use crate::rules::finding::FindingsSet;

/// The two choices offered while presenting findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Cancel,
    Proceed,
}

/// Answer to a justification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JustificationReply {
    Text(String),
    Cancel,
}

pub trait PresentationSurface {
    fn name(&self) -> &'static str;

    /// Show every finding and the rule reference, then ask cancel vs proceed.
    fn present(&mut self, findings: &FindingsSet, rules: &str) -> Result<Action, MetagateError>;

    /// Ask for a justification. `rejection` explains why the previous
    /// answer was not accepted.
    fn justify(&mut self, rejection: Option<&str>) -> Result<JustificationReply, MetagateError>;
}

/// Pick the dialog when allowed and available, else the console on the
/// controlling terminal.
pub fn select_surface(allow_dialog: bool) -> Box<dyn PresentationSurface> {
    if allow_dialog {
        match DialogSurface::detect() {
            Some(dialog) => return Box::new(dialog),
            None => info!("graphical dialog unavailable, using console prompt"),
        }
    }
    Box::new(ConsoleSurface::terminal())
}
