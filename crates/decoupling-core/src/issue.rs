// crates/decoupling-core/src/issue.rs

use std::fmt;

use serde::Serialize;

/// Report level of a single check outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Pass,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Format,
    Completeness,
    Range,
    Calculation,
    DuplicateKey,
    Schema,
    Ordering,
    RowCount,
    Correlation,
    Outlier,
    Traceability,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Format => "format",
            IssueCategory::Completeness => "completeness",
            IssueCategory::Range => "range",
            IssueCategory::Calculation => "calculation",
            IssueCategory::DuplicateKey => "duplicate_key",
            IssueCategory::Schema => "schema",
            IssueCategory::Ordering => "ordering",
            IssueCategory::RowCount => "row_count",
            IssueCategory::Correlation => "correlation",
            IssueCategory::Outlier => "outlier",
            IssueCategory::Traceability => "traceability",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded check outcome. Fields are private so an issue cannot change
/// after it has been created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    category: IssueCategory,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<f64>,
}

impl Issue {
    pub fn new(category: IssueCategory, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            evidence: None,
        }
    }

    pub fn pass(category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Pass, message)
    }

    pub fn info(category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Info, message)
    }

    pub fn warn(category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Warn, message)
    }

    pub fn error(category: IssueCategory, message: impl Into<String>) -> Self {
        Self::new(category, Severity::Error, message)
    }

    pub fn with_evidence(mut self, value: f64) -> Self {
        self.evidence = Some(value);
        self
    }

    pub fn category(&self) -> IssueCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evidence(&self) -> Option<f64> {
        self.evidence
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// True when none of the issues is ERROR severity.
pub fn error_free(issues: &[Issue]) -> bool {
    !issues.iter().any(Issue::is_error)
}
