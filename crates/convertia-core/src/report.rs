//! Validation report model
//!
//! A file scan produces a `ValidationResult`: an ordered list of
//! `ValidationIssue`s, each tagged with the check that produced it and a
//! severity. A single `Blocking` issue means the file must never reach a
//! converter or be persisted outside its temp path. `Warning` issues are
//! logged but do not reject on their own.

use serde::Serialize;

/// How severe a detected problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The file must not be processed or stored.
    Blocking,
    /// Suspicious but not decisive; logged, never rejects alone.
    Warning,
}

/// Which validator produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCheck {
    SignatureScan,
    StructuralValidation,
    MimeConsistency,
    EmbeddedPayload,
    FilenameCheck,
    UploadPolicy,
}

/// A single detected problem.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub message: String,
    pub severity: Severity,
    pub source_check: SourceCheck,
}

/// Aggregate outcome of running checks against one file's bytes.
///
/// Constructed fresh per upload and discarded when the request completes;
/// never persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no blocking issue was recorded.
    pub fn is_safe(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Blocking)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn push_blocking(&mut self, source_check: SourceCheck, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            message: message.into(),
            severity: Severity::Blocking,
            source_check,
        });
    }

    pub fn push_warning(&mut self, source_check: SourceCheck, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            message: message.into(),
            severity: Severity::Warning,
            source_check,
        });
    }

    /// Append all issues from another result, preserving order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// Messages of blocking issues only, for audit logging.
    pub fn blocking_messages(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Blocking)
            .map(|issue| issue.message.as_str())
            .collect()
    }
}
