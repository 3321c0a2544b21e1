//! Line protocol between a guided program and its controller.
//!
//! One exchange per guided value:
//! 1. program: `STATE <frame>;<frame>;...;`
//! 2. controller: one line holding the value
//! 3. program: `ACTION <value>`
//!
//! After the last value the program prints `DONE <tree>` and exits.

pub const STATE_TAG: &str = "STATE";
pub const ACTION_TAG: &str = "ACTION";
pub const DONE_TAG: &str = "DONE";

/// A classified line of guided program output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    State(String),
    Action(String),
    Done(String),
    /// Anything untagged, e.g. diagnostics a program prints on stdout.
    Other(String),
}

impl Message {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = strip_tag(line, STATE_TAG) {
            Message::State(rest.to_string())
        } else if let Some(rest) = strip_tag(line, ACTION_TAG) {
            Message::Action(rest.to_string())
        } else if let Some(rest) = strip_tag(line, DONE_TAG) {
            Message::Done(rest.to_string())
        } else {
            Message::Other(line.to_string())
        }
    }

    /// Whether this line is part of the protocol.
    pub fn is_tagged(&self) -> bool {
        !matches!(self, Message::Other(_))
    }
}

/// Strip `tag` plus one separating space. `STATE` alone counts as an empty payload,
/// `STATEFUL` does not match.
fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}
