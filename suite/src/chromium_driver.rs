//! `BrowserDriver` backed by a headless Chromium through the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::{
    browser::{Browser, BrowserConfig},
    cdp::browser_protocol::dom::SetFileInputFilesParams,
    Page,
};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sitecheck::{BrowserDriver, Error, HarnessConfiguration, Locator};
use std::{fmt, fmt::Display, path::Path};
use tokio::task::JoinHandle;
use tracing::debug;

const VISIBLE: &str = "const s = getComputedStyle(e); const r = e.getBoundingClientRect(); \
                       const visible = s.display !== 'none' && s.visibility !== 'hidden' \
                       && r.width > 0 && r.height > 0;";

fn driver_error<E: Display>(e: E) -> Error {
    Error::DriverError(e.to_string())
}

fn js_string(value: &str) -> String {
    Value::String(value.into()).to_string()
}

/// JavaScript expression evaluating to the element addressed by `locator`, or `null`.
fn element_expression(locator: &Locator) -> String {
    match locator {
        Locator::Css(css) => format!("document.querySelector({})", js_string(css)),
        Locator::Text { css: Some(css), text } => format!(
            "(Array.from(document.querySelectorAll({})).find(e => e.textContent.trim() === {}) || null)",
            js_string(css),
            js_string(text)
        ),
        Locator::Text { css: None, text } => format!(
            "(Array.from(document.querySelectorAll('body *')).find(e => e.children.length === 0 && e.textContent.trim() === {}) || null)",
            js_string(text)
        ),
    }
}

/// JavaScript expression evaluating to every element addressed by `locator`.
fn elements_expression(locator: &Locator) -> String {
    match locator {
        Locator::Css(css) => format!("Array.from(document.querySelectorAll({}))", js_string(css)),
        Locator::Text { css, text } => format!(
            "Array.from(document.querySelectorAll({})).filter(e => e.textContent.trim() === {})",
            js_string(css.as_deref().unwrap_or("body *")),
            js_string(text)
        ),
    }
}

pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumDriver").finish()
    }
}

impl ChromiumDriver {
    /// Launch a headless Chromium with the configured viewport and open a blank page.
    ///
    /// # Arguments
    /// `configuration` - the harness configuration of the running scenario.
    ///
    /// # Returns
    /// A ChromiumDriver driving the new page.
    pub async fn launch(configuration: &HarnessConfiguration) -> Result<Self, Error> {
        let (width, height) = configuration.viewport();
        let browser_config = BrowserConfig::builder()
            .window_size(width, height)
            .build()
            .map_err(Error::DriverError)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(driver_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(driver_error)?;
        debug!(width, height, "chromium launched");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    pub async fn close(mut self) -> Result<(), Error> {
        self.browser.close().await.map_err(driver_error)?;
        self.browser.wait().await.map_err(driver_error)?;
        self.handler.abort();
        Ok(())
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> Result<T, Error> {
        self.page
            .evaluate(script)
            .await
            .map_err(driver_error)?
            .into_value()
            .map_err(driver_error)
    }

    /// Run `body` with the element bound to `e`; `None` when nothing matches the locator.
    async fn with_element<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        body: &str,
    ) -> Result<Option<T>, Error> {
        let script = format!(
            "(() => {{ const e = {}; if (!e) return null; {} }})()",
            element_expression(locator),
            body
        );
        self.evaluate(script).await
    }

    async fn on_element<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        body: &str,
    ) -> Result<T, Error> {
        self.with_element(locator, body)
            .await?
            .ok_or_else(|| Error::ElementNotFound(locator.clone()))
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<(), Error> {
        self.page.goto(url).await.map_err(driver_error)?;
        Ok(())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self
            .with_element::<bool>(locator, "return true;")
            .await?
            .is_some())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self
            .with_element(locator, &format!("{} return visible;", VISIBLE))
            .await?
            .unwrap_or(false))
    }

    async fn is_actionable(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self
            .with_element(locator, &format!("{} return visible && !e.disabled;", VISIBLE))
            .await?
            .unwrap_or(false))
    }

    async fn clear(&self, locator: &Locator) -> Result<(), Error> {
        self.on_element::<bool>(
            locator,
            "e.focus(); \
             const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(e), 'value').set; \
             setter.call(e, ''); \
             e.dispatchEvent(new Event('input', { bubbles: true })); \
             return true;",
        )
        .await?;
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), Error> {
        self.on_element::<bool>(locator, "e.focus(); return true;")
            .await?;
        self.page
            .find_element(":focus")
            .await
            .map_err(driver_error)?
            .type_str(text)
            .await
            .map_err(driver_error)?;
        Ok(())
    }

    async fn click(&self, locator: &Locator, force: bool) -> Result<(), Error> {
        if !force && !self.is_actionable(locator).await? {
            return Err(if self.exists(locator).await? {
                Error::ElementNotInteractable(locator.clone())
            } else {
                Error::ElementNotFound(locator.clone())
            });
        }

        self.on_element::<bool>(
            locator,
            "e.scrollIntoView({ block: 'center' }); \
             const t = e.matches('input, select, textarea, button') ? e : (e.querySelector('input') || e); \
             for (const type of ['mousedown', 'mouseup', 'click']) { \
                 t.dispatchEvent(new MouseEvent(type, { bubbles: true, cancelable: true, view: window })); \
             } \
             return true;",
        )
        .await?;
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<(), Error> {
        self.on_element::<bool>(
            locator,
            "if (!e.checked) { e.click(); } return true;",
        )
        .await?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), Error> {
        let selected = self
            .on_element::<bool>(
                locator,
                &format!(
                    "const o = Array.from(e.options || []).find(o => o.textContent.trim() === {}); \
                     if (!o) return false; \
                     e.value = o.value; \
                     e.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                     return true;",
                    js_string(label)
                ),
            )
            .await?;

        if selected {
            Ok(())
        } else {
            Err(Error::OptionNotFound {
                target: locator.clone(),
                option: label.into(),
            })
        }
    }

    async fn attach_file(&self, locator: &Locator, path: &Path) -> Result<(), Error> {
        let css = match locator {
            Locator::Css(css) => css,
            Locator::Text { .. } => return Err(Error::ElementNotInteractable(locator.clone())),
        };

        let element = self.page.find_element(css.as_str()).await.map_err(driver_error)?;
        let mut params = SetFileInputFilesParams::new(vec![path.display().to_string()]);
        params.backend_node_id = Some(element.backend_node_id);
        self.page.execute(params).await.map_err(driver_error)?;
        Ok(())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), Error> {
        self.on_element::<bool>(
            locator,
            "e.scrollIntoView({ block: 'center' }); return true;",
        )
        .await?;
        Ok(())
    }

    async fn input_value(&self, locator: &Locator) -> Result<String, Error> {
        self.on_element(locator, "return e.value ?? '';").await
    }

    async fn text_content(&self, locator: &Locator) -> Result<String, Error> {
        self.on_element(locator, "return e.textContent ?? '';").await
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>, Error> {
        self.evaluate(format!(
            "{}.map(e => e.textContent ?? '')",
            elements_expression(locator)
        ))
        .await
    }

    async fn css_value(&self, locator: &Locator, property: &str) -> Result<String, Error> {
        self.on_element(
            locator,
            &format!(
                "return getComputedStyle(e).getPropertyValue({});",
                js_string(property)
            ),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locators_are_quoted_into_scripts() {
        assert_eq!(
            element_expression(&Locator::css("#firstName")),
            "document.querySelector(\"#firstName\")"
        );
        assert!(element_expression(&Locator::text("O'Neil \"Jr\""))
            .contains("=== \"O'Neil \\\"Jr\\\"\""));
        assert!(elements_expression(&Locator::css_with_text(".option", "Maths"))
            .starts_with("Array.from(document.querySelectorAll(\".option\"))"));
    }
}
