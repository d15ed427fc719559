/// Append-only session log backing the log pane. Load milestones, filter
/// toggles, marker popups, and caught faults all land here; there is no
/// other observability channel.
#[derive(Default)]
pub struct EventLog {
    lines: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    #[allow(dead_code)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> &[String] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }
}
