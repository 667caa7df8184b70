use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};

use crate::error::MetagateError;
use crate::gate::surface::{Action, JustificationReply, PresentationSurface};
use crate::report::render::render_findings;
use crate::rules::finding::FindingsSet;

const TTY_PATH: &str = "/dev/tty";

/// Text prompt over any reader/writer pair. End of input means cancel.
pub struct ConsoleSurface<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleSurface<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// `None` on end of input.
    fn read_line(&mut self) -> Result<Option<String>, MetagateError> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(surface_err)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, text: &str) -> Result<(), MetagateError> {
        write!(self.output, "{text}").map_err(surface_err)?;
        self.output.flush().map_err(surface_err)
    }
}

impl ConsoleSurface<Box<dyn BufRead>, Box<dyn Write>> {
    /// Bind to the controlling terminal. Git hands the push hook its ref
    /// list on stdin, so answers have to come from `/dev/tty`; without a
    /// terminal, stdin and stderr are used instead.
    pub fn terminal() -> Self {
        let tty_in = File::open(TTY_PATH);
        let tty_out = OpenOptions::new().write(true).open(TTY_PATH);
        match (tty_in, tty_out) {
            (Ok(input), Ok(output)) => Self::new(Box::new(BufReader::new(input)), Box::new(output)),
            _ => Self::stdio(),
        }
    }

    /// Answers from stdin, prompts to stderr.
    pub fn stdio() -> Self {
        Self::new(Box::new(BufReader::new(io::stdin())), Box::new(io::stderr()))
    }
}

fn surface_err(err: io::Error) -> MetagateError {
    MetagateError::Surface(err.to_string())
}

impl<R: BufRead, W: Write> PresentationSurface for ConsoleSurface<R, W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn present(&mut self, findings: &FindingsSet, rules: &str) -> Result<Action, MetagateError> {
        let header = format!(
            "\nMetadata validation failed with {} finding(s).\n\n{}\nValidation rules:\n{}\n",
            findings.len(),
            render_findings(findings),
            rules
        );
        self.prompt(&header)?;
        loop {
            self.prompt("Proceed with a justification [p] or cancel [c]? ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(Action::Cancel);
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "p" | "proceed" => return Ok(Action::Proceed),
                "c" | "cancel" => return Ok(Action::Cancel),
                _ => self.prompt("Please answer 'p' or 'c'.\n")?,
            }
        }
    }

    fn justify(&mut self, rejection: Option<&str>) -> Result<JustificationReply, MetagateError> {
        if let Some(reason) = rejection {
            self.prompt(&format!("Not accepted: {reason}.\n"))?;
        }
        self.prompt("Justification (or 'cancel'): ")?;
        match self.read_line()? {
            None => Ok(JustificationReply::Cancel),
            Some(line) if line.trim().eq_ignore_ascii_case("cancel") => Ok(JustificationReply::Cancel),
            Some(line) => Ok(JustificationReply::Text(line)),
        }
    }
}
