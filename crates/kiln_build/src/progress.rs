//! Stage progress messages for interactive use.

use std::io::Write;

/// Receives a message as each build stage starts.
///
/// Progress output is cosmetic; write failures are ignored.
pub trait Progress {
    /// Reports that a stage is starting.
    fn step(&mut self, message: &str);

    /// Reports that the build finished all stages.
    fn finish(&mut self) {}
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn step(&mut self, _message: &str) {}
}

/// Writes numbered progress lines to a terminal stream.
///
/// With `keep_lines` each message ends in a newline. Otherwise every message
/// overwrites the current line and `finish` clears it.
#[derive(Debug)]
pub struct TerminalProgress<W: Write> {
    out: W,
    counter: usize,
    keep_lines: bool,
}

impl TerminalProgress<std::io::Stdout> {
    /// Progress on standard output.
    pub fn stdout(keep_lines: bool) -> Self {
        Self::new(std::io::stdout(), keep_lines)
    }
}

impl<W: Write> TerminalProgress<W> {
    /// Progress on `out`.
    pub fn new(out: W, keep_lines: bool) -> Self {
        Self {
            out,
            counter: 0,
            keep_lines,
        }
    }

    /// Consumes the reporter, returning the stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let end = if self.keep_lines { "\n" } else { "" };
        let _ = write!(self.out, "\r\x1b[K {text}{end}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Progress for TerminalProgress<W> {
    fn step(&mut self, message: &str) {
        let text = format!("{}: {message}", self.counter);
        self.emit(&text);
        self.counter += 1;
    }

    fn finish(&mut self) {
        if !self.keep_lines {
            self.emit("");
        }
    }
}
