//! Human-readable diagnostics for failed or skipped test cases

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The test failed
    Error,
    /// The test could not be judged (skipped or set up incorrectly)
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A labelled line of context attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub label: String,
    pub text: String,
}

/// A diagnostic message with context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code, when the diagnostic concerns an engine fault
    pub code: Option<ErrorCode>,
    /// Headline message
    pub message: String,
    /// Context lines (query text, outcome, assertion)
    pub notes: Vec<Note>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a context line
    pub fn with_note(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.notes.push(Note {
            label: label.into(),
            text: text.into(),
        });
        self
    }

    /// Look up a context line by label
    pub fn note(&self, label: &str) -> Option<&str> {
        self.notes
            .iter()
            .find(|n| n.label == label)
            .map(|n| n.text.as_str())
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let head = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().cyan().bold(),
        };
        let mut out = match &self.code {
            Some(code) => format!("{}[{}]: {}", head, code, self.message),
            None => format!("{}: {}", head, self.message),
        };
        for note in &self.notes {
            out.push_str(&format!("\n  {}: {}", note.label.cyan(), indent(&note.text)));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}[{}]: {}", self.severity, code, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        for note in &self.notes {
            write!(f, "\n  {}: {}", note.label, indent(&note.text))?;
        }
        Ok(())
    }
}

/// Continuation lines of multi-line notes are indented under the label
fn indent(text: &str) -> String {
    text.replace('\n', "\n    ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::error("assertion failed")
            .with_code(ErrorCode::new("XPST0003"))
            .with_note("query", "1 +")
            .with_note("outcome", "error XPST0003");

        let text = diag.to_string();
        assert!(text.starts_with("error[XPST0003]: assertion failed"));
        assert!(text.contains("\n  query: 1 +"));
        assert_eq!(diag.note("outcome"), Some("error XPST0003"));
    }

    #[test]
    fn test_multiline_note_is_indented() {
        let diag = Diagnostic::warning("skipped").with_note("query", "let $x := 1\nreturn $x");
        assert!(diag.to_string().contains("let $x := 1\n    return $x"));
    }
}
