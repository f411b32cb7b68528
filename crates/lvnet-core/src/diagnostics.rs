//! Findings collected while checking a reference catalog.
//!
//! Catalog checks report every problem they find instead of stopping at the
//! first one, so an engineer fixing a conductor table sees the whole list.
//! Each finding carries a severity, a category ("structure", "reference",
//! "invariant", "table", "limits") and optionally the table entry it concerns.
//!
//! # Example
//!
//! ```
//! use lvnet_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("table", "No standard transformer ratings listed");
//! diag.add_error_with_entity("invariant", "ampacity must be positive", "conductor cu-6");
//!
//! assert_eq!(diag.summary(), "1 warning, 1 error");
//! assert!(diag.into_result().is_err());
//! ```

use crate::error::{LvError, LvResult};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but usable, e.g. a gap between demand brackets
    Warning,
    /// The catalog cannot be used for a study
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: String,
    pub message: String,
    /// Table entry the finding refers to, e.g. "conductor cal-35"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.severity, self.category, self.message)?;
        match &self.entity {
            Some(entity) => write!(f, " ({})", entity),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, category: &str, message: &str, entity: Option<&str>) {
        let issue = DiagnosticIssue::new(severity, category, message);
        self.issues.push(match entity {
            Some(entity) => issue.with_entity(entity),
            None => issue,
        });
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.push(Severity::Warning, category, message, None);
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.push(Severity::Warning, category, message, Some(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.push(Severity::Error, category, message, None);
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.push(Severity::Error, category, message, Some(entity));
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// "No issues", "2 warnings", "1 warning, 3 errors", ...
    pub fn summary(&self) -> String {
        fn counted(n: usize, noun: &str) -> String {
            format!("{} {}{}", n, noun, if n == 1 { "" } else { "s" })
        }

        let parts: Vec<String> = [
            (self.warning_count(), "warning"),
            (self.error_count(), "error"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, noun)| counted(n, noun))
        .collect();

        if parts.is_empty() {
            "No issues".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Fail with a validation error listing every error-level issue.
    ///
    /// Warnings alone do not fail.
    pub fn into_result(self) -> LvResult<Diagnostics> {
        if !self.has_errors() {
            return Ok(self);
        }
        let listed: Vec<String> = self.errors().map(|issue| issue.to_string()).collect();
        Err(LvError::Validation(format!(
            "{}: {}",
            self.summary(),
            listed.join("; ")
        )))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Catalog check: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut diag = Diagnostics::new();
        assert!(!diag.has_issues());

        diag.add_warning("table", "gap between brackets");
        diag.add_error("invariant", "ampacity must be positive");
        diag.add_warning_with_entity("table", "gap", "demand row 2");

        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_issues());
        assert!(diag.has_errors());
        assert_eq!(diag.errors().count(), 1);
    }

    #[test]
    fn test_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_error_with_entity("invariant", "drop coefficient must be positive", "cal-35");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("\"entity\": \"cal-35\""));

        let empty = serde_json::to_string(&Diagnostics::new()).unwrap();
        assert_eq!(empty, "{}");
    }

    #[test]
    fn test_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Error, "reference", "duplicate id")
            .with_entity("conductor cal-70");
        assert_eq!(
            issue.to_string(),
            "[error:reference] duplicate id (conductor cal-70)"
        );

        let bare = DiagnosticIssue::new(Severity::Warning, "limits", "critical above max");
        assert_eq!(bare.to_string(), "[warning:limits] critical above max");
    }

    #[test]
    fn test_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning("table", "warning");
        assert_eq!(diag.summary(), "1 warning");

        diag.add_error("table", "error");
        assert_eq!(diag.summary(), "1 warning, 1 error");

        diag.add_warning("table", "another warning");
        diag.add_error("table", "another error");
        assert_eq!(diag.summary(), "2 warnings, 2 errors");

        let mut errors_only = Diagnostics::new();
        errors_only.add_error("structure", "no conductors");
        assert_eq!(errors_only.summary(), "1 error");
    }

    #[test]
    fn test_into_result() {
        let mut warnings_only = Diagnostics::new();
        warnings_only.add_warning("table", "gap between brackets");
        assert!(warnings_only.into_result().is_ok());

        let mut with_error = Diagnostics::new();
        with_error.add_error_with_entity("invariant", "ampacity must be positive", "cu-6");
        let err = with_error.into_result().unwrap_err();
        assert!(matches!(err, LvError::Validation(_)));
        assert!(err.to_string().contains("cu-6"));
    }
}
