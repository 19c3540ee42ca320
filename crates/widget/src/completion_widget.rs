use std::sync::Arc;

use async_trait::async_trait;
use rust_i18n::t;

use services::CompletionService;
use track_core::model::{UserId, WidgetConfig};

use crate::content::WidgetContent;
use crate::fragment::progress_fragment;
use crate::widget::{ApplicableFormats, Widget, WidgetError};

/// The course-completion progress widget.
///
/// One instance exists per placement on a page; the host drives it through
/// the `Widget` lifecycle and displays the resulting content.
pub struct CompletionWidget {
    user_id: UserId,
    config: WidgetConfig,
    completion: Arc<CompletionService>,
    title: String,
    content: Option<WidgetContent>,
}

impl CompletionWidget {
    #[must_use]
    pub fn new(user_id: UserId, config: WidgetConfig, completion: Arc<CompletionService>) -> Self {
        Self {
            user_id,
            config,
            completion,
            title: String::new(),
            content: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    async fn render_content(&self) -> Result<WidgetContent, WidgetError> {
        if let Some(text) = self.config.text() {
            // The override is the only user-authored HTML that can reach the
            // page; it does not get to carry scripts.
            return Ok(WidgetContent::from_text(ammonia::clean(text)));
        }

        let percent = self
            .completion
            .percent_for_user(self.user_id, self.config.role(), self.config.evidence())
            .await?;
        let report_url = self.config.report_url()?;
        let fragment = progress_fragment(percent, &report_url, self.config.locale());
        Ok(WidgetContent::from_text(fragment.into_string()))
    }
}

#[async_trait]
impl Widget for CompletionWidget {
    fn init(&mut self) {
        self.title = t!("pluginname", locale = self.config.locale()).into_owned();
    }

    fn specialization(&mut self) {
        // Load the user-defined title and make sure it is never empty.
        self.title = match self.config.title() {
            Some(title) => title.to_owned(),
            None => t!("usertitle", locale = self.config.locale()).into_owned(),
        };
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn instance_allow_multiple(&self) -> bool {
        true
    }

    fn applicable_formats(&self) -> ApplicableFormats {
        ApplicableFormats::everywhere()
    }

    async fn content(&mut self) -> Result<WidgetContent, WidgetError> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }

        let content = self.render_content().await?;
        self.content = Some(content.clone());
        Ok(content)
    }
}
