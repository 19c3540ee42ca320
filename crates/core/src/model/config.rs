use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::completion::EvidenceSource;
use crate::model::ids::RoleId;

/// Path of the detailed progress report, relative to the site root.
pub const REPORT_PATH: &str = "/report/coursestudyhistory/";

/// Per-instance widget configuration.
///
/// The host stores one of these per placed widget instance. All display
/// fields are optional; empty or whitespace-only strings behave as absent,
/// matching how the host treats unset form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default = "default_role")]
    role: RoleId,
    #[serde(default)]
    evidence: EvidenceSource,
    site_root: Url,
    #[serde(default = "default_locale")]
    locale: String,
}

fn default_role() -> RoleId {
    RoleId::STUDENT
}

fn default_locale() -> String {
    "en".to_owned()
}

impl WidgetConfig {
    /// Creates a configuration with defaults for everything but the site root.
    #[must_use]
    pub fn new(site_root: Url) -> Self {
        Self {
            title: None,
            text: None,
            role: RoleId::STUDENT,
            evidence: EvidenceSource::default(),
            site_root,
            locale: default_locale(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = role;
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: EvidenceSource) -> Self {
        self.evidence = evidence;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// The configured title, treating empty strings as absent.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The configured content override, treating empty strings as absent.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn role(&self) -> RoleId {
        self.role
    }

    #[must_use]
    pub fn evidence(&self) -> EvidenceSource {
        self.evidence
    }

    #[must_use]
    pub fn site_root(&self) -> &Url {
        &self.site_root
    }

    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The absolute URL of the detailed progress report.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the report path cannot be joined onto the
    /// site root (only possible for degenerate roots such as `data:` URLs).
    pub fn report_url(&self) -> Result<Url, url::ParseError> {
        self.site_root.join(REPORT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site_root() -> Url {
        Url::parse("https://campus.example.edu").unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = WidgetConfig::new(site_root());
        assert_eq!(config.title(), None);
        assert_eq!(config.text(), None);
        assert_eq!(config.role(), RoleId::STUDENT);
        assert_eq!(config.evidence(), EvidenceSource::CompletionTracking);
        assert_eq!(config.locale(), "en");
    }

    #[test]
    fn config_filters_blank_title_and_text() {
        let config = WidgetConfig::new(site_root()).with_title("   ").with_text("");
        assert_eq!(config.title(), None);
        assert_eq!(config.text(), None);
    }

    #[test]
    fn config_trims_title() {
        let config = WidgetConfig::new(site_root()).with_title("  My progress  ");
        assert_eq!(config.title(), Some("My progress"));
    }

    #[test]
    fn report_url_joins_fixed_path() {
        let config = WidgetConfig::new(site_root());
        let url = config.report_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://campus.example.edu/report/coursestudyhistory/"
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"site_root":"https://campus.example.edu"}"#).unwrap();
        assert_eq!(config.role(), RoleId::STUDENT);
        assert_eq!(config.evidence(), EvidenceSource::CompletionTracking);
    }
}
