use async_trait::async_trait;
use thiserror::Error;

use services::CompletionServiceError;

use crate::content::WidgetContent;

/// Errors surfaced while producing widget content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WidgetError {
    #[error(transparent)]
    Completion(#[from] CompletionServiceError),
    #[error("invalid report url: {0}")]
    ReportUrl(#[from] url::ParseError),
}

/// Page types a widget may be placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicableFormats {
    pub all: bool,
    pub module: bool,
}

impl ApplicableFormats {
    /// Valid on every page type the host offers.
    #[must_use]
    pub fn everywhere() -> Self {
        Self {
            all: true,
            module: true,
        }
    }
}

/// Host-facing widget contract.
///
/// The host constructs a widget per page render and drives it through
/// `init` -> `specialization` -> `content`; the other methods are static
/// declarations it may query at any point.
#[async_trait]
pub trait Widget: Send {
    /// Set the initial display title. Called once after construction.
    fn init(&mut self);

    /// Apply per-instance configuration. Called immediately after `init`.
    fn specialization(&mut self);

    /// The current display title.
    fn title(&self) -> &str;

    /// Whether the host may place several instances on one page.
    fn instance_allow_multiple(&self) -> bool;

    /// The page types this widget is valid on.
    fn applicable_formats(&self) -> ApplicableFormats;

    /// Produce the content payload for display.
    ///
    /// # Errors
    ///
    /// Returns `WidgetError` if the underlying data cannot be read.
    async fn content(&mut self) -> Result<WidgetContent, WidgetError>;
}
