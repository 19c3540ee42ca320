#![forbid(unsafe_code)]

pub mod completion_service;
pub mod error;
pub mod widget_services;

pub use completion_service::CompletionService;
pub use error::{CompletionServiceError, WidgetServicesError};
pub use widget_services::WidgetServices;
