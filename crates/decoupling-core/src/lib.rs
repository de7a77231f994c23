pub mod config;
pub mod enrichment;
pub mod error;
pub mod frame;
pub mod io;
pub mod issue;
pub mod logger;
pub mod outliers;
pub mod panel_validator;
pub mod period;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod series_validator;
pub mod stats;

pub use config::ValidationConfig;
pub use issue::{Issue, IssueCategory, Severity};
pub use logger::ReportLogger;
pub use report::{generate_quality_report, QualityReport};
pub use schema::SeriesKind;
