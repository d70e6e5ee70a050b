use chrono::NaiveDate;
use std::fmt;

/// Which column of the grid a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Plan,
    Result,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportKind::Plan => "plan",
            ReportKind::Result => "result",
        })
    }
}

/// A single report fragment found in a message.
///
/// `date` is `None` when the fragment carried no `M/D` token; the caller is
/// expected to substitute the date the message was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub kind: ReportKind,
    pub summary: String,
    pub date: Option<NaiveDate>,
}

/// Trims `s` and keeps at most `max_len` characters.
pub fn normalize_summary(s: &str, max_len: usize) -> String {
    s.trim().chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_summary() {
        assert_eq!(normalize_summary("  設計レビュー \r", 50), "設計レビュー");
        assert_eq!(normalize_summary("   ", 50), "");

        let long = "あ".repeat(60);
        let normalized = normalize_summary(&format!("  {}  ", long), 50);
        assert_eq!(normalized.chars().count(), 50);
        assert_eq!(normalized, "あ".repeat(50));
    }

    #[test]
    fn test_truncate_after_trim() {
        // Leading blanks must not count toward the limit.
        let text = format!("{}{}", " ".repeat(10), "x".repeat(50));
        assert_eq!(normalize_summary(&text, 50), "x".repeat(50));
    }
}
