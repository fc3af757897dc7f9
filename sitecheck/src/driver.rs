use crate::error::Error;
use async_trait::async_trait;
use std::{fmt, fmt::Debug, path::Path};

/// Address of one control on a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// First element whose trimmed text equals `text`, optionally restricted to elements
    /// matching `css`.
    Text { css: Option<String>, text: String },
}

impl Locator {
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        Locator::Text {
            css: None,
            text: text.into(),
        }
    }

    pub fn css_with_text<S1: Into<String>, S2: Into<String>>(selector: S1, text: S2) -> Self {
        Locator::Text {
            css: Some(selector.into()),
            text: text.into(),
        }
    }

    /// Locator for the descendants of a CSS-addressed element.
    pub fn descendants(&self, selector: &str) -> Self {
        match self {
            Locator::Css(css) => Locator::Css(format!("{} {}", css, selector)),
            Locator::Text { .. } => Locator::Css(String::from(selector)),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(css) => write!(f, "`{}`", css),
            Locator::Text { css: None, text } => write!(f, "text \"{}\"", text),
            Locator::Text {
                css: Some(css),
                text,
            } => write!(f, "`{}` with text \"{}\"", css, text),
        }
    }
}

/// The automation primitives a browser has to offer.
///
/// Queries (`exists`, `is_visible`, `is_actionable`) answer immediately; waiting is layered on
/// top by the callers. Actions report `Error::ElementNotFound` when nothing matches the
/// locator.
#[async_trait]
pub trait BrowserDriver: Debug {
    async fn goto(&self, url: &str) -> Result<(), Error>;

    async fn exists(&self, locator: &Locator) -> Result<bool, Error>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool, Error>;

    /// Visible and enabled.
    async fn is_actionable(&self, locator: &Locator) -> Result<bool, Error>;

    async fn clear(&self, locator: &Locator) -> Result<(), Error>;

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), Error>;

    /// A forced click skips the visibility check, so controls hidden behind a styled label can
    /// still be operated.
    async fn click(&self, locator: &Locator, force: bool) -> Result<(), Error>;

    async fn check(&self, locator: &Locator) -> Result<(), Error>;

    /// Pick an option of a native `<select>` by its label.
    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), Error>;

    async fn attach_file(&self, locator: &Locator, path: &Path) -> Result<(), Error>;

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), Error>;

    async fn input_value(&self, locator: &Locator) -> Result<String, Error>;

    async fn text_content(&self, locator: &Locator) -> Result<String, Error>;

    /// Texts of every element matching the locator, in document order.
    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>, Error>;

    async fn css_value(&self, locator: &Locator, property: &str) -> Result<String, Error>;
}
