use crate::{
    driver::{BrowserDriver, Locator},
    error::Error,
    wait::WaitBudget,
};
use chrono::Month;
use std::path::Path;
use tracing::debug;

/// Selectors of the react-datepicker calendar widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSelectors {
    pub year_select: Locator,
    pub month_select: Locator,
    /// Day cells are addressed as `{day_cell_prefix}0DD`.
    pub day_cell_prefix: String,
    pub outside_month_class: String,
}

impl CalendarSelectors {
    pub fn day_cell(&self, day: u32) -> Locator {
        Locator::css(format!(
            "{}{}:not({})",
            self.day_cell_prefix,
            day_token(day),
            self.outside_month_class
        ))
    }
}

impl Default for CalendarSelectors {
    fn default() -> Self {
        Self {
            year_select: Locator::css(".react-datepicker__year-select"),
            month_select: Locator::css(".react-datepicker__month-select"),
            day_cell_prefix: String::from(".react-datepicker__day--"),
            outside_month_class: String::from(".react-datepicker__day--outside-month"),
        }
    }
}

/// `0` followed by the two-digit zero-padded day, e.g. `015` for the 15th.
pub fn day_token(day: u32) -> String {
    format!("0{:02}", day)
}

/// Atomic operations on single form controls.
///
/// Primitives never scroll; bringing below-the-fold controls into view is left to the page
/// that composes them.
#[derive(Debug)]
pub struct FieldInteractions<'a, D: BrowserDriver + ?Sized> {
    driver: &'a D,
    wait: WaitBudget,
    fixtures_dir: &'a Path,
    calendar: CalendarSelectors,
}

impl<'a, D: BrowserDriver + ?Sized> FieldInteractions<'a, D> {
    pub fn new(driver: &'a D, wait: WaitBudget, fixtures_dir: &'a Path) -> Self {
        Self {
            driver,
            wait,
            fixtures_dir,
            calendar: CalendarSelectors::default(),
        }
    }

    pub fn driver(&self) -> &'a D {
        self.driver
    }

    pub fn wait(&self) -> WaitBudget {
        self.wait
    }

    /// Replace the content of a text control with `value`.
    pub async fn fill_text(&self, target: &Locator, value: &str) -> Result<(), Error> {
        debug!(locator = %target, "filling text");
        self.wait_actionable(target).await?;
        self.driver.clear(target).await?;
        self.driver.type_text(target, value).await
    }

    /// Force a checkbox or radio into the checked state, even when a styled label covers it.
    pub async fn set_checked(&self, target: &Locator) -> Result<(), Error> {
        debug!(locator = %target, "checking");
        self.wait_exists(target).await?;
        self.driver.check(target).await
    }

    pub async fn click(&self, target: &Locator) -> Result<(), Error> {
        debug!(locator = %target, "clicking");
        self.wait_actionable(target).await?;
        self.driver.click(target, false).await
    }

    /// Open a custom dropdown and click the option whose text is exactly `option_label`.
    pub async fn choose_dropdown_option(
        &self,
        target: &Locator,
        option_label: &str,
    ) -> Result<(), Error> {
        debug!(locator = %target, option = option_label, "choosing dropdown option");
        self.wait_exists(target).await?;
        self.driver.click(target, true).await?;

        let option = Locator::text(option_label);
        self.wait
            .until(&format!("option {}", option), || self.driver.is_visible(&option))
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => Error::OptionNotFound {
                    target: target.clone(),
                    option: option_label.into(),
                },
                e => e,
            })?;

        self.driver.click(&option, true).await
    }

    /// Pick an option of a native `<select>` by label.
    pub async fn select_native_option(&self, target: &Locator, label: &str) -> Result<(), Error> {
        debug!(locator = %target, option = label, "selecting option");
        self.wait_exists(target).await?;
        self.driver.select_option(target, label).await
    }

    /// Attach a file from the fixture directory.
    pub async fn upload_file(&self, target: &Locator, file_name: &str) -> Result<(), Error> {
        let path = self.fixtures_dir.join(file_name);
        debug!(locator = %target, path = %path.display(), "uploading fixture");

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => (),
            _ => return Err(Error::FixtureNotFound(path)),
        }

        self.wait_exists(target).await?;
        self.driver.attach_file(target, &path).await
    }

    /// Pick a date through the calendar widget opened by `target`.
    pub async fn set_date(
        &self,
        target: &Locator,
        year: i32,
        month: Month,
        day: u32,
    ) -> Result<(), Error> {
        debug!(locator = %target, year, month = month.name(), day, "setting date");
        self.click(target).await?;
        self.select_native_option(&self.calendar.year_select, &year.to_string())
            .await?;
        self.select_native_option(&self.calendar.month_select, month.name())
            .await?;

        let cell = self.calendar.day_cell(day);
        self.wait
            .until(&format!("day cell {}", cell), || self.driver.is_visible(&cell))
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => Error::DateCellNotFound(day_token(day)),
                e => e,
            })?;

        self.driver.click(&cell, false).await
    }

    async fn wait_actionable(&self, target: &Locator) -> Result<(), Error> {
        self.wait
            .until(&format!("{} to be actionable", target), || {
                self.driver.is_actionable(target)
            })
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => Error::ElementNotInteractable(target.clone()),
                e => e,
            })
    }

    async fn wait_exists(&self, target: &Locator) -> Result<(), Error> {
        self.wait
            .until(&format!("{} to exist", target), || self.driver.exists(target))
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => Error::ElementNotInteractable(target.clone()),
                e => e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedRegistrationPage;
    use std::{path::PathBuf, time::Duration};

    fn budget() -> WaitBudget {
        WaitBudget::new(Duration::from_millis(100)).with_poll_interval(Duration::from_millis(10))
    }

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    async fn loaded_page() -> SimulatedRegistrationPage {
        let page = SimulatedRegistrationPage::new();
        page.goto("https://demoqa.com/automation-practice-form")
            .await
            .unwrap();
        page
    }

    #[test]
    fn test_day_token_is_zero_prefixed() {
        assert_eq!(day_token(5), "005");
        assert_eq!(day_token(15), "015");
        assert_eq!(
            CalendarSelectors::default().day_cell(15),
            Locator::css(
                ".react-datepicker__day--015:not(.react-datepicker__day--outside-month)"
            )
        );
    }

    #[tokio::test]
    async fn test_fill_text_twice_replaces_content() {
        let page = loaded_page().await;
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);
        let first_name = Locator::css("#firstName");

        interactions.fill_text(&first_name, "Jane").await.unwrap();
        interactions.fill_text(&first_name, "Jane").await.unwrap();

        assert_eq!(page.input_value(&first_name).await.unwrap(), "Jane");
    }

    #[tokio::test]
    async fn test_fill_text_on_hidden_control_is_not_interactable() {
        let page = loaded_page().await;
        page.hide("#firstName");
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);

        let result = interactions
            .fill_text(&Locator::css("#firstName"), "Jane")
            .await;

        assert!(matches!(result, Err(Error::ElementNotInteractable(_))));
    }

    #[tokio::test]
    async fn test_set_checked_tolerates_hidden_radio() {
        let page = loaded_page().await;
        page.hide("#gender-radio-2");
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);

        interactions
            .set_checked(&Locator::css("#gender-radio-2"))
            .await
            .unwrap();

        assert_eq!(
            page.checked_labels(),
            vec![String::from("Female")]
        );
    }

    #[tokio::test]
    async fn test_unknown_dropdown_option() {
        let page = loaded_page().await;
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);
        let state = Locator::css("#state");

        let result = interactions
            .choose_dropdown_option(&state, "Atlantis")
            .await;

        match result {
            Err(Error::OptionNotFound { target, option }) => {
                assert_eq!(target, state);
                assert_eq!(option, "Atlantis");
            }
            other => panic!("Expected a missing option, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_fixture() {
        let page = loaded_page().await;
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);

        let result = interactions
            .upload_file(&Locator::css("#uploadPicture"), "does-not-exist.png")
            .await;

        match result {
            Err(Error::FixtureNotFound(path)) => {
                assert!(path.ends_with("does-not-exist.png"))
            }
            other => panic!("Expected a missing fixture, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_day_outside_the_month_grid() {
        let page = loaded_page().await;
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);

        let result = interactions
            .set_date(&Locator::css("#dateOfBirthInput"), 1990, Month::February, 30)
            .await;

        match result {
            Err(Error::DateCellNotFound(token)) => assert_eq!(token, "030"),
            other => panic!("Expected a missing day cell, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_date() {
        let page = loaded_page().await;
        let fixtures = fixtures();
        let interactions = FieldInteractions::new(&page, budget(), &fixtures);
        let input = Locator::css("#dateOfBirthInput");

        interactions
            .set_date(&input, 1990, Month::July, 15)
            .await
            .unwrap();

        assert_eq!(page.input_value(&input).await.unwrap(), "15 Jul 1990");
    }
}
