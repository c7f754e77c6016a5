//! A single physical line of a ledger file.
//!
//! Rules only ever see the line body. The terminator is split off when the
//! input is read and put back verbatim when the line is written, so CRLF files
//! and a missing final newline survive the migration unchanged.

use std::fmt;

/// Line ending found after a line body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// Final line of a file that does not end with a newline.
    None,
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminator::Lf => "\n",
            Terminator::CrLf => "\r\n",
            Terminator::None => "",
        }
    }
}

/// One line: body text plus its original terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: String,
    terminator: Terminator,
}

impl Line {
    pub fn new(text: impl Into<String>, terminator: Terminator) -> Self {
        Self {
            text: text.into(),
            terminator,
        }
    }

    /// Split a raw physical line (as produced by `split_inclusive('\n')`).
    pub fn from_raw(raw: &str) -> Self {
        if let Some(body) = raw.strip_suffix("\r\n") {
            Self::new(body, Terminator::CrLf)
        } else if let Some(body) = raw.strip_suffix('\n') {
            Self::new(body, Terminator::Lf)
        } else {
            Self::new(raw, Terminator::None)
        }
    }

    /// The line body without its terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn terminator(&self) -> Terminator {
        self.terminator
    }

    /// Same terminator, new body.
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            terminator: self.terminator,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        f.write_str(self.terminator.as_str())
    }
}

/// Split input text into lines, keeping every terminator.
///
/// Joining the `Display` output of the returned lines reproduces `input`
/// byte for byte. An empty input yields no lines.
pub fn split_lines(input: &str) -> Vec<Line> {
    input.split_inclusive('\n').map(Line::from_raw).collect()
}
