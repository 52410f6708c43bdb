//! Ordered log of side effects emitted by bodies.

use std::fmt;

/// Lines emitted by bodies, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    lines: Vec<String>,
    enabled: bool,
}

impl Journal {
    pub fn new(enabled: bool) -> Self {
        Self {
            lines: Vec::new(),
            enabled,
        }
    }

    /// Append a line. Ignored when the journal is disabled.
    pub fn push(&mut self, line: impl Into<String>) {
        if self.enabled {
            self.lines.push(line.into());
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Remove and return every recorded line.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_journal_records_nothing() {
        let mut journal = Journal::new(false);
        journal.push("ignored");
        assert!(journal.is_empty());
    }

    #[test]
    fn take_drains_lines() {
        let mut journal = Journal::new(true);
        journal.push("first");
        journal.push(String::from("second"));
        assert_eq!(journal.to_string(), "first\nsecond\n");
        assert_eq!(journal.take(), vec!["first", "second"]);
        assert!(journal.is_empty());
    }
}
