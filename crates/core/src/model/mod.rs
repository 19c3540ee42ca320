mod completion;
mod config;
mod course;
mod ids;

pub use completion::{
    CertificateKind, CompletionError, CompletionPercent, CompletionRecord, EvidenceSource,
};
pub use config::{WidgetConfig, REPORT_PATH};
pub use course::{Course, CourseError};
pub use ids::{CourseId, ParseIdError, RoleId, UserId};
