#![forbid(unsafe_code)]

pub mod completion_widget;
pub mod content;
pub mod fragment;
pub mod widget;

rust_i18n::i18n!("locales", fallback = "en");

pub use completion_widget::CompletionWidget;
pub use content::WidgetContent;
pub use fragment::progress_fragment;
pub use widget::{ApplicableFormats, Widget, WidgetError};
