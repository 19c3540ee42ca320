use maud::{Markup, html};
use rust_i18n::t;
use url::Url;

use track_core::model::CompletionPercent;

/// Render the completion progress bar plus the report link.
///
/// The percentage appears three times with the same integral value: as the
/// ARIA value, as the bar width, and as the visible label.
#[must_use]
pub fn progress_fragment(percent: CompletionPercent, report_url: &Url, locale: &str) -> Markup {
    let value = percent.display_value();
    html! {
        div class="progress" {
            div class="progress-bar progress-bar-info progress-bar-striped"
                role="progressbar"
                aria-valuenow=(value)
                aria-valuemin="0"
                aria-valuemax="100"
                style=(format!("width:{value}%")) {
                (value) "%"
            }
        }
        div class="text-center" {
            a href=(report_url.as_str()) { (t!("view_progress", locale = locale)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_url() -> Url {
        Url::parse("https://campus.example.edu/report/coursestudyhistory/").unwrap()
    }

    fn render(completed: u32, total: u32) -> String {
        let percent = CompletionPercent::from_ratio(completed, total);
        progress_fragment(percent, &report_url(), "en").into_string()
    }

    #[test]
    fn fragment_embeds_percent_as_aria_value_and_width() {
        let html = render(3, 4);
        assert!(html.contains(r#"aria-valuenow="75""#));
        assert!(html.contains("width:75%"));
        assert!(html.contains(">75%<"));
    }

    #[test]
    fn fragment_renders_zero_as_zero() {
        let html = render(0, 0);
        assert!(html.contains(r#"aria-valuenow="0""#));
        assert!(html.contains("width:0%"));
    }

    #[test]
    fn fragment_keeps_fixed_bounds() {
        let html = render(1, 3);
        assert!(html.contains(r#"aria-valuemin="0""#));
        assert!(html.contains(r#"aria-valuemax="100""#));
    }

    #[test]
    fn fragment_links_to_report() {
        let html = render(1, 2);
        assert!(html.contains("View progress"));
        assert!(html.contains("/report/coursestudyhistory/"));
    }

    #[test]
    fn fragment_is_deterministic() {
        assert_eq!(render(2, 3), render(2, 3));
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let percent = CompletionPercent::from_ratio(1, 2);
        let html = progress_fragment(percent, &report_url(), "xx").into_string();
        assert!(html.contains("View progress"));
    }
}
