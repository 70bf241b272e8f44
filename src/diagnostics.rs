//! Soft diagnostics raised while rewriting a translation unit.
//!
//! A diagnostic never stops the pipeline: the transform still produces its best-effort
//! output and the caller decides whether a diagnostic is fatal. Each one carries the byte
//! offset it refers to, a severity, a stable kebab-case code and a message.
//!
//! Codes
//!
//!     unterminated-comment, unterminated-string, unterminated-char,
//!     unterminated-raw-string: the tokenizer closed a construct at end of line or input.
//!     missing-type, implicit-int, unbalanced-template, split-angle, extent-too-long: the
//!     relocator refused to move a leading qualifier.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub offset: usize,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn new(offset: usize, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            offset,
            severity,
            message: message.into(),
            code: None,
        }
    }

    pub fn warning(offset: usize, message: impl Into<String>) -> Self {
        Self::new(offset, DiagnosticSeverity::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(
                f,
                "{}[{}]: {} at byte {}",
                self.severity, code, self.message, self.offset
            ),
            None => write!(f, "{}: {} at byte {}", self.severity, self.message, self.offset),
        }
    }
}

/// Zero-based line and column (in chars) of a byte offset.
///
/// Offsets past the end clamp to the end of the source.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count();
    (line, column)
}

/// Format source code context around a diagnostic.
///
/// Shows 2 lines before the offending line, the line itself with a >> marker, and 2 lines
/// after. All lines are numbered for easy reference.
pub fn format_source_context(source: &str, offset: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let (error_line, _) = line_col(source, offset);

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();
    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }
    context
}
