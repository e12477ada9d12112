//! Progress bar on stderr.

use std::io::{self, Write};

use rayzip::ProgressSink;

const BAR_WIDTH: usize = 30;

/// Redraws a single progress line on stderr.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    last: Option<u8>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, percent: u8, status: &str) {
        // Only redraw when the bar moves.
        if self.last == Some(percent) && percent < 100 {
            return;
        }
        self.last = Some(percent);

        let filled = BAR_WIDTH * percent as usize / 100;
        let mut stderr = io::stderr();
        let _ = write!(
            stderr,
            "\r[{}{}] {:>3}% {:<40}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            percent,
            status
        );
        if percent >= 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}
