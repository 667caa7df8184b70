//! Override workflow state machine.
//!
//! ```text
//!   IDLE ──(no findings)──────────────────────────────▶ PASSED
//!   IDLE ──(findings)──▶ PRESENTING ──cancel──────────▶ CANCELLED
//!                             │
//!                          proceed
//!                             ▼
//!                        JUSTIFYING ──cancel──────────▶ CANCELLED
//!                          │    ▲
//!              unqualified │    │ re-prompt
//!                          └────┘
//!                             │ qualifying text
//!                             ▼
//!                        OVERRIDDEN
//! ```
//!
//! A surface error at any point counts as cancel, so an interrupted prompt
//! never yields a pass. There is no retry limit while justifying.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gate::justification;
use crate::gate::surface::{Action, JustificationReply, PresentationSurface};
use crate::rules::catalog::reference_text;
use crate::rules::finding::FindingsSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Idle,
    Presenting,
    Justifying,
    Cancelled,
    Overridden,
    Passed,
}

/// The human decision collected for a failing run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverrideDecision {
    pub proceed: bool,
    pub justification: Option<String>,
}

impl OverrideDecision {
    pub fn cancel() -> Self {
        Self {
            proceed: false,
            justification: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    /// Every state entered, starting at `Idle`.
    pub trail: Vec<WorkflowState>,
    /// `None` only when there was nothing to decide.
    pub decision: Option<OverrideDecision>,
    /// Number of justifications turned down before the final answer.
    pub rejections: usize,
}

impl WorkflowOutcome {
    pub fn state(&self) -> WorkflowState {
        self.trail.last().copied().unwrap_or(WorkflowState::Idle)
    }

    pub fn passed(&self) -> bool {
        matches!(self.state(), WorkflowState::Passed | WorkflowState::Overridden)
    }
}

/// Drive the workflow for `findings` through `surface`.
pub fn run_override(findings: &FindingsSet, surface: &mut dyn PresentationSurface) -> WorkflowOutcome {
    let mut outcome = WorkflowOutcome {
        trail: vec![WorkflowState::Idle],
        decision: None,
        rejections: 0,
    };
    if findings.is_empty() {
        outcome.trail.push(WorkflowState::Passed);
        return outcome;
    }

    outcome.trail.push(WorkflowState::Presenting);
    debug!(surface = surface.name(), findings = findings.len(), "presenting findings");
    match surface.present(findings, &reference_text()) {
        Ok(Action::Proceed) => {}
        Ok(Action::Cancel) => return cancelled(outcome),
        Err(err) => {
            warn!(error = %err, "override prompt failed, treating as cancel");
            return cancelled(outcome);
        }
    }

    outcome.trail.push(WorkflowState::Justifying);
    let mut rejection: Option<String> = None;
    loop {
        let reply = match surface.justify(rejection.as_deref()) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "justification prompt failed, treating as cancel");
                return cancelled(outcome);
            }
        };
        let text = match reply {
            JustificationReply::Cancel => return cancelled(outcome),
            JustificationReply::Text(text) => text,
        };
        match justification::assess(&text) {
            Ok(accepted) => {
                info!("validation failures overridden");
                outcome.trail.push(WorkflowState::Overridden);
                outcome.decision = Some(OverrideDecision {
                    proceed: true,
                    justification: Some(accepted),
                });
                return outcome;
            }
            Err(reason) => {
                debug!(%reason, "justification rejected");
                outcome.rejections += 1;
                rejection = Some(reason);
            }
        }
    }
}

fn cancelled(mut outcome: WorkflowOutcome) -> WorkflowOutcome {
    info!("override cancelled");
    outcome.trail.push(WorkflowState::Cancelled);
    outcome.decision = Some(OverrideDecision::cancel());
    outcome
}
