//! Core diagnostic message types.
//!
//! A diagnostic is a title plus structured context: a problem statement,
//! bulleted details and hints. Rendering follows the tidyverse bullet style.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
        }
    }
}

/// How detail items should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (ℹ bullet)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
}

/// A structured diagnostic message.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "PF-3-2") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error or Warning
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub details: Vec<DetailItem>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hints: Vec<String>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Prefer [`crate::DiagnosticMessageBuilder`] for anything with details.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Set the error code (`PF-<subsystem>-<number>`).
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Render as text.
    ///
    /// ```text
    /// Error [PF-3-2]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// • Note detail
    /// ? Hint
    /// ```
    ///
    /// A bare message renders as a single line without a trailing newline.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        match &self.code {
            Some(code) => lines.push(format!("{} [{}]: {}", self.kind.label(), code, self.title)),
            None => lines.push(format!("{}: {}", self.kind.label(), self.title)),
        }
        if let Some(problem) = &self.problem {
            lines.push(problem.clone());
        }
        for detail in &self.details {
            lines.push(format!("{} {}", detail.kind.bullet(), detail.content));
        }
        for hint in &self.hints {
            lines.push(format!("? {}", hint));
        }

        let mut result = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                result.push('\n');
            }
            // Indent continuation lines of multi-line details.
            let _ = write!(result, "{}", line.replace('\n', "\n  "));
        }
        result
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "kind": "error",
                "title": self.title,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DiagnosticMessageBuilder;

    #[test]
    fn test_diagnostic_message_new() {
        let msg = DiagnosticMessage::new(DiagnosticKind::Error, "Test error");
        assert_eq!(msg.title, "Test error");
        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert!(msg.code.is_none());
        assert!(msg.problem.is_none());
        assert!(msg.details.is_empty());
        assert!(msg.hints.is_empty());
    }

    #[test]
    fn test_to_text_warning() {
        let msg = DiagnosticMessage::warning("Variable ignored").with_code("PF-2-4");
        assert_eq!(msg.to_text(), "Warning [PF-2-4]: Variable ignored");
        assert_eq!(msg.to_json()["kind"], "warning");
    }

    #[test]
    fn test_to_text_simple_error() {
        let msg = DiagnosticMessage::error("Something went wrong");
        assert_eq!(msg.to_text(), "Error: Something went wrong");
    }

    #[test]
    fn test_to_text_with_code() {
        let msg = DiagnosticMessage::error("Something went wrong").with_code("PF-3-1");
        assert_eq!(msg.to_text(), "Error [PF-3-1]: Something went wrong");
    }

    #[test]
    fn test_to_text_full_message() {
        let msg = DiagnosticMessageBuilder::error("Invalid host entry")
            .problem("host 'vm1': missing 'address' field")
            .add_detail("expected string @ data['port']")
            .add_info("incomplete entries must refer to a profile")
            .add_note("checked 3 hosts")
            .add_hint("Add an `address` field?")
            .build();

        let text = msg.to_text();
        assert!(text.starts_with("Error: Invalid host entry\n"));
        assert!(text.contains("host 'vm1': missing 'address' field"));
        assert!(text.contains("✖ expected string @ data['port']"));
        assert!(text.contains("ℹ incomplete entries must refer to a profile"));
        assert!(text.contains("• checked 3 hosts"));
        assert!(text.ends_with("? Add an `address` field?"));
    }

    #[test]
    fn test_to_text_indents_multiline_details() {
        let msg = DiagnosticMessageBuilder::error("Nested")
            .add_detail("first\nsecond")
            .build();
        assert_eq!(msg.to_text(), "Error: Nested\n✖ first\n  second");
    }

    #[test]
    fn test_to_json() {
        let msg = DiagnosticMessageBuilder::error("Undefined profile")
            .with_code("PF-3-2")
            .problem("profile 'web' not defined in config")
            .add_hint("Define the profile under `profiles`?")
            .build();
        let json = msg.to_json();

        assert_eq!(json["kind"], "error");
        assert_eq!(json["code"], "PF-3-2");
        assert_eq!(json["problem"], "profile 'web' not defined in config");
        assert_eq!(json["hints"][0], "Define the profile under `profiles`?");
        assert!(json.get("details").is_none());
    }
}
