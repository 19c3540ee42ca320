/// Content payload a host dashboard renders for one widget instance.
///
/// `items`, `icons`, and `footer` are required by the host's display contract
/// even when a widget only fills `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetContent {
    pub text: String,
    pub items: Vec<String>,
    pub icons: Vec<String>,
    pub footer: String,
}

impl WidgetContent {
    /// Content consisting of a single HTML body.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_leaves_placeholders_empty() {
        let content = WidgetContent::from_text("<p>hi</p>");
        assert_eq!(content.text, "<p>hi</p>");
        assert!(content.items.is_empty());
        assert!(content.icons.is_empty());
        assert!(content.footer.is_empty());
    }
}
