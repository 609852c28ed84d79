//! Issue collection for network validation.
//!
//! [`Network::validate`](crate::Network::validate) walks the whole network and
//! records every problem it finds instead of stopping at the first one, so a
//! malformed case is reported in one pass. Errors block a solve; warnings
//! (an unbalanced injection vector, say) are logged and the solve proceeds.
//!
//! # Example
//!
//! ```
//! use dcflow_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning("balance", "Injections sum to 0.1 pu; slack absorbs the mismatch");
//! diag.add_error_with_entity("parameter", "Reactance must be positive", "Line 2");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! assert!(diag.into_result().is_err());
//! ```

use crate::error::{DcFlowError, DcFlowResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but solvable
    Warning,
    /// The network cannot be solved as given
    Error,
}

/// A single issue found while validating a network
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key: "topology", "parameter", "reference", "balance"
    pub category: String,
    pub message: String,
    /// Element the issue is about, e.g. "Bus 2" or "Line 0"
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

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of validation issues
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error(&mut self, category: &str, message: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn issues_by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// Get summary string
    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();

        match (warnings, errors) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, e) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (w, e) => format!(
                "{} warning{}, {} error{}",
                w,
                if w == 1 { "" } else { "s" },
                e,
                if e == 1 { "" } else { "s" }
            ),
        }
    }

    /// Fold every error into one [`DcFlowError::InvalidNetwork`]. Warnings pass.
    pub fn into_result(self) -> DcFlowResult<()> {
        if !self.has_errors() {
            return Ok(());
        }
        let messages: Vec<String> = self.errors().map(|issue| issue.to_string()).collect();
        Err(DcFlowError::InvalidNetwork(messages.join("; ")))
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
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
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        diag.add_warning("balance", "unbalanced");
        diag.add_error("topology", "too few buses");
        diag.add_warning_with_entity("topology", "isolated bus", "Bus 3");

        assert_eq!(diag.warning_count(), 2);
        assert_eq!(diag.error_count(), 1);
        assert!(diag.has_errors());
        assert_eq!(diag.issues_by_category("topology").count(), 2);
    }

    #[test]
    fn test_add_keeps_prebuilt_issue() {
        let mut diag = Diagnostics::new();
        diag.add(
            DiagnosticIssue::new(Severity::Error, "reference", "slack missing").with_entity("Bus 4"),
        );

        let issue = diag.errors().next().unwrap();
        assert_eq!(issue.entity.as_deref(), Some("Bus 4"));
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add_error_with_entity("reference", "Unknown bus 7", "Line 1");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"error\""));
        assert!(json.contains("\"entity\": \"Line 1\""));
    }

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning("balance", "warning");
        assert_eq!(diag.summary(), "1 warning");

        diag.add_error("parameter", "error");
        assert_eq!(diag.summary(), "1 warning, 1 error");

        diag.add_error("parameter", "another error");
        assert_eq!(diag.summary(), "1 warning, 2 errors");
    }

    #[test]
    fn test_into_result_joins_errors_and_ignores_warnings() {
        let mut diag = Diagnostics::new();
        diag.add_warning("balance", "unbalanced");
        assert!(diag.clone().into_result().is_ok());

        diag.add_error_with_entity("parameter", "Reactance must be positive", "Line 0");
        diag.add_error_with_entity("reference", "Unknown bus 9", "Line 1");
        let err = diag.into_result().unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, DcFlowError::InvalidNetwork(_)));
        assert!(message.contains("Line 0"));
        assert!(message.contains("Unknown bus 9"));
        assert!(!message.contains("unbalanced"));
    }
}
