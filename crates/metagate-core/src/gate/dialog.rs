use std::env;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::MetagateError;
use crate::gate::surface::{Action, JustificationReply, PresentationSurface};
use crate::report::render::render_findings;
use crate::rules::finding::FindingsSet;

const DIALOG_BIN: &str = "zenity";
const TITLE: &str = "API metadata validation";

/// Graphical prompt driven through `zenity`.
///
/// Closing a window or any non-zero dialog exit is read as cancel.
#[derive(Debug)]
pub struct DialogSurface {
    program: String,
}

impl DialogSurface {
    /// A usable dialog, or `None` when there is no display or the dialog
    /// program does not start.
    pub fn detect() -> Option<Self> {
        if !has_display() {
            debug!("no display in environment");
            return None;
        }
        let status = Command::new(DIALOG_BIN)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => Some(Self {
                program: DIALOG_BIN.to_string(),
            }),
            Ok(status) => {
                debug!(%status, "dialog program refused --version");
                None
            }
            Err(err) => {
                debug!(error = %err, "dialog program not found");
                None
            }
        }
    }

    fn run(&self, args: &[&str]) -> Result<Option<String>, MetagateError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MetagateError::Surface(e.to_string()))?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim_end().to_string()))
        } else {
            Ok(None)
        }
    }
}

fn has_display() -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| env::var_os(var).is_some_and(|v| !v.is_empty()))
}

impl PresentationSurface for DialogSurface {
    fn name(&self) -> &'static str {
        "dialog"
    }

    fn present(&mut self, findings: &FindingsSet, rules: &str) -> Result<Action, MetagateError> {
        let text = format!(
            "Metadata validation failed.\n\n{}\nValidation rules:\n{}",
            render_findings(findings),
            rules
        );
        let answer = self.run(&[
            "--question",
            "--no-markup",
            "--width=720",
            "--title",
            TITLE,
            "--ok-label=Proceed",
            "--cancel-label=Cancel",
            "--text",
            &text,
        ])?;
        Ok(if answer.is_some() {
            Action::Proceed
        } else {
            Action::Cancel
        })
    }

    fn justify(&mut self, rejection: Option<&str>) -> Result<JustificationReply, MetagateError> {
        let text = match rejection {
            Some(reason) => format!("Not accepted: {reason}.\nWhy must this push go ahead?"),
            None => "Why must this push go ahead?".to_string(),
        };
        let answer = self.run(&["--entry", "--title", TITLE, "--width=600", "--text", &text])?;
        Ok(match answer {
            Some(line) => JustificationReply::Text(line),
            None => JustificationReply::Cancel,
        })
    }
}
