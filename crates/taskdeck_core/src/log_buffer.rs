/// Hard cap on buffered log text, in characters.
pub const LOG_BUFFER_CAP: usize = 300_000;
/// Characters kept (newest) once the cap is exceeded.
pub const LOG_BUFFER_KEEP: usize = 250_000;
/// Distance from the bottom, in lines, that still counts as pinned.
pub const PIN_THRESHOLD_LINES: usize = 2;

/// Tail of a task log as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogTail {
    pub lines: Vec<String>,
    pub truncated: bool,
}

/// Scroll state of the log pane, reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogViewport {
    pub top_line: usize,
    pub visible_lines: usize,
}

impl LogViewport {
    pub fn is_pinned(&self, total_lines: usize) -> bool {
        let bottom = self.top_line.saturating_add(self.visible_lines);
        total_lines <= bottom.saturating_add(PIN_THRESHOLD_LINES)
    }

    pub(crate) fn scrolled_to_bottom(self, total_lines: usize) -> Self {
        Self {
            top_line: total_lines.saturating_sub(self.visible_lines),
            visible_lines: self.visible_lines,
        }
    }
}

/// Append-only text with a drop-oldest size cap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogBuffer {
    text: String,
    chars: usize,
    lines: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.chars
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.chars = 0;
        self.lines = 0;
    }

    /// Replaces the whole buffer with `lines`, each newline-terminated.
    pub fn replace_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        for line in lines {
            self.push_line(line.as_ref());
        }
        self.enforce_cap();
    }

    /// Appends one line and applies the cap. Returns true when old content was dropped.
    pub fn append_line(&mut self, line: &str) -> bool {
        self.push_line(line);
        self.enforce_cap()
    }

    fn push_line(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        self.chars += line.chars().count() + 1;
        self.lines += line.matches('\n').count() + 1;
    }

    fn enforce_cap(&mut self) -> bool {
        if self.chars <= LOG_BUFFER_CAP {
            return false;
        }
        let drop_chars = self.chars - LOG_BUFFER_KEEP;
        let cut = self
            .text
            .char_indices()
            .nth(drop_chars)
            .map_or(self.text.len(), |(idx, _)| idx);
        self.text.drain(..cut);
        self.chars = LOG_BUFFER_KEEP;
        self.lines = self.text.matches('\n').count();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_newline_terminated() {
        let mut buffer = LogBuffer::new();
        buffer.replace_lines(["a", "b"]);
        buffer.append_line("c");
        assert_eq!(buffer.text(), "a\nb\nc\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.char_len(), 6);
    }

    #[test]
    fn overflow_keeps_newest_window() {
        let mut buffer = LogBuffer::new();
        let filler = "x".repeat(999);
        for _ in 0..300 {
            buffer.append_line(&filler);
        }
        assert_eq!(buffer.char_len(), LOG_BUFFER_CAP);

        let dropped = buffer.append_line("newest");
        assert!(dropped);
        assert_eq!(buffer.char_len(), LOG_BUFFER_KEEP);
        assert_eq!(buffer.text().chars().count(), LOG_BUFFER_KEEP);
        assert!(buffer.text().ends_with("newest\n"));
    }

    #[test]
    fn cap_cuts_on_char_boundaries() {
        let mut buffer = LogBuffer::new();
        let wide = "é".repeat(LOG_BUFFER_CAP);
        buffer.append_line(&wide);
        assert_eq!(buffer.char_len(), LOG_BUFFER_KEEP);
        assert_eq!(buffer.text().chars().count(), LOG_BUFFER_KEEP);
        assert!(buffer.text().ends_with("é\n"));
    }

    #[test]
    fn viewport_pinned_within_threshold() {
        let viewport = LogViewport {
            top_line: 10,
            visible_lines: 20,
        };
        assert!(viewport.is_pinned(30));
        assert!(viewport.is_pinned(32));
        assert!(!viewport.is_pinned(33));
        assert_eq!(viewport.scrolled_to_bottom(50).top_line, 30);
    }
}
