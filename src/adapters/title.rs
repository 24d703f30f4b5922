//! Window title adapters.
//!
//! - **TerminalTitle** - sets the terminal window title with an OSC escape
//! - **RecordingTitle** - remembers every title it was given (testing)

use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};

use crate::ports::TitleSink;

/// Writes `ESC ] 0 ; <title> BEL` to stdout when stdout is a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalTitle;

impl TerminalTitle {
    /// Builds the escape sequence for `title`, stripping control characters.
    pub fn escape_sequence(title: &str) -> String {
        let clean: String = title.chars().filter(|c| !c.is_control()).collect();
        format!("\x1b]0;{}\x07", clean)
    }

    /// Writes the escape for `title` to `out` unless `out` is redirected.
    ///
    /// Returns whether anything was written.
    pub fn write_title(out: &mut impl Write, is_terminal: bool, title: &str) -> io::Result<bool> {
        if !is_terminal {
            return Ok(false);
        }
        out.write_all(Self::escape_sequence(title).as_bytes())?;
        out.flush()?;
        Ok(true)
    }
}

impl TitleSink for TerminalTitle {
    fn set_title(&self, title: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let is_terminal = stdout.is_terminal();
        Self::write_title(&mut stdout.lock(), is_terminal, title).map(|_| ())
    }
}

/// Title sink that records titles in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTitle {
    titles: Arc<Mutex<Vec<String>>>,
}

impl RecordingTitle {
    pub fn new() -> Self {
        Self::default()
    }

    /// All titles set so far, oldest first.
    pub fn titles(&self) -> Vec<String> {
        self.titles
            .lock()
            .map(|titles| titles.clone())
            .unwrap_or_default()
    }

    /// The most recent title.
    pub fn last(&self) -> Option<String> {
        self.titles().pop()
    }
}

impl TitleSink for RecordingTitle {
    fn set_title(&self, title: &str) -> io::Result<()> {
        self.titles
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "title recorder poisoned"))?
            .push(title.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_sequence_wraps_title() {
        assert_eq!(
            TerminalTitle::escape_sequence("24:55 | Work Cycles"),
            "\x1b]0;24:55 | Work Cycles\x07"
        );
    }

    #[test]
    fn escape_sequence_strips_control_characters() {
        assert_eq!(TerminalTitle::escape_sequence("a\x07b\nc"), "\x1b]0;abc\x07");
    }

    #[test]
    fn redirected_output_gets_no_escape() {
        let mut out = Vec::new();
        let written = TerminalTitle::write_title(&mut out, false, "24:55 | Work Cycles").unwrap();

        assert!(!written);
        assert!(out.is_empty());
    }

    #[test]
    fn terminal_output_gets_escape() {
        let mut out = Vec::new();
        let written = TerminalTitle::write_title(&mut out, true, "Work Cycles").unwrap();

        assert!(written);
        assert_eq!(out, b"\x1b]0;Work Cycles\x07");
    }

    #[test]
    fn recording_title_keeps_history() {
        let sink = RecordingTitle::new();
        sink.set_title("one").unwrap();
        sink.set_title("two").unwrap();

        assert_eq!(sink.titles(), vec!["one", "two"]);
        assert_eq!(sink.last().as_deref(), Some("two"));
    }
}
