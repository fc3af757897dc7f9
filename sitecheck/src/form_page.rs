use crate::{
    configuration::HarnessConfiguration,
    driver::{BrowserDriver, Locator},
    error::Error,
    form_data::FormUserData,
    interactions::FieldInteractions,
    wait::WaitBudget,
};
use chrono::{Datelike, Month};
use std::fmt;
use tracing::{debug, info};

pub const FORM_PATH: &str = "automation-practice-form";
pub const CONFIRMATION_TITLE: &str = "Thanks for submitting the form";
/// Border colour of a required input that failed validation.
pub const INVALID_BORDER_COLOR: &str = "rgb(220, 53, 69)";

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// One stable locator per logical field of the student registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationSelectors {
    pub form: Locator,
    pub form_wrapper: Locator,
    pub fixed_ban_close: Locator,
    pub first_name: Locator,
    pub last_name: Locator,
    pub email: Locator,
    pub mobile: Locator,
    pub date_of_birth: Locator,
    pub subjects_input: Locator,
    /// CSS of the autocomplete entries shown while typing a subject.
    pub subject_option_css: String,
    pub picture: Locator,
    pub current_address: Locator,
    pub state: Locator,
    pub city: Locator,
    pub submit: Locator,
    pub confirmation: Locator,
    pub confirmation_title: Locator,
    pub confirmation_table: Locator,
    pub close_button: Locator,
}

impl Default for RegistrationSelectors {
    fn default() -> Self {
        Self {
            form: Locator::css("#userForm"),
            form_wrapper: Locator::css(".practice-form-wrapper"),
            fixed_ban_close: Locator::css("#close-fixedban"),
            first_name: Locator::css("#firstName"),
            last_name: Locator::css("#lastName"),
            email: Locator::css("#userEmail"),
            mobile: Locator::css("#userNumber"),
            date_of_birth: Locator::css("#dateOfBirthInput"),
            subjects_input: Locator::css("#subjectsInput"),
            subject_option_css: String::from(".subjects-auto-complete__option"),
            picture: Locator::css("#uploadPicture"),
            current_address: Locator::css("#currentAddress"),
            state: Locator::css("#state"),
            city: Locator::css("#city"),
            submit: Locator::css("#submit"),
            confirmation: Locator::css(".modal-content"),
            confirmation_title: Locator::css("#example-modal-sizes-title-lg"),
            confirmation_table: Locator::css(".table-responsive"),
            close_button: Locator::css("#closeLargeModal"),
        }
    }
}

/// Logical groups of the form, in the order a user fills them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormSection {
    Identity,
    Demographics,
    Academics,
    Media,
    Address,
    Locality,
}

impl FormSection {
    pub const ALL: [FormSection; 6] = [
        FormSection::Identity,
        FormSection::Demographics,
        FormSection::Academics,
        FormSection::Media,
        FormSection::Address,
        FormSection::Locality,
    ];

    /// Sections in the footer region that have to be scrolled into view first.
    pub fn is_below_the_fold(self) -> bool {
        matches!(self, FormSection::Address | FormSection::Locality)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormState {
    Unsubmitted,
    Submitted,
    Confirmed,
    Dismissed,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FormState {
    fn name(self) -> &'static str {
        match self {
            FormState::Unsubmitted => "unsubmitted",
            FormState::Submitted => "submitted",
            FormState::Confirmed => "confirmed",
            FormState::Dismissed => "dismissed",
        }
    }
}

/// The (label, value) pairs the confirmation table should echo for `data`.
///
/// Composite fields come out already joined the way the confirmation renders them.
pub fn expected_rows(data: &FormUserData) -> Vec<(&'static str, String)> {
    let mut rows = vec![("Student Name", data.full_name())];

    if let Some(email) = data.email() {
        rows.push(("Student Email", email.into()));
    }
    rows.push(("Gender", data.gender().label().into()));
    rows.push(("Mobile", data.mobile().into()));
    if let Some(date) = data.date_of_birth() {
        rows.push(("Date of Birth", date.format("%d %B,%Y").to_string()));
    }
    if !data.subjects().is_empty() {
        rows.push(("Subjects", data.subjects().join(", ")));
    }
    if !data.hobbies().is_empty() {
        let hobbies = data
            .hobbies()
            .iter()
            .map(|hobby| hobby.label())
            .collect::<Vec<_>>();
        rows.push(("Hobbies", hobbies.join(", ")));
    }
    if let Some(picture) = data.picture() {
        rows.push(("Picture", picture.into()));
    }
    if let Some(address) = data.current_address() {
        rows.push(("Address", address.into()));
    }
    if let Some(locality) = data.locality() {
        rows.push((
            "State and City",
            format!("{} {}", locality.state, locality.city),
        ));
    }

    rows
}

/// Value of the row labelled `label` in a flattened `[label, value, label, value, ...]` list of
/// table cells.
pub fn row_value<'c>(cells: &'c [String], label: &str) -> Option<&'c str> {
    cells
        .iter()
        .position(|cell| cell.trim() == label)
        .and_then(|index| cells.get(index + 1))
        .map(|value| value.trim())
}

/// Page object of the student registration form.
#[derive(Debug)]
pub struct RegistrationForm<'a, D: BrowserDriver + ?Sized> {
    interactions: FieldInteractions<'a, D>,
    url: String,
    selectors: RegistrationSelectors,
    state: FormState,
}

impl<'a, D: BrowserDriver + ?Sized> RegistrationForm<'a, D> {
    pub fn new(driver: &'a D, configuration: &'a HarnessConfiguration) -> Self {
        let interactions = FieldInteractions::new(
            driver,
            WaitBudget::from_configuration(configuration),
            configuration.fixtures_dir(),
        );

        Self {
            interactions,
            url: format!("{}{}", configuration.form_base_url(), FORM_PATH),
            selectors: RegistrationSelectors::default(),
            state: FormState::Unsubmitted,
        }
    }

    pub fn with_selectors(mut self, selectors: RegistrationSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn selectors(&self) -> &RegistrationSelectors {
        &self.selectors
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn driver(&self) -> &'a D {
        self.interactions.driver()
    }

    fn wait(&self) -> WaitBudget {
        self.interactions.wait()
    }

    pub async fn visit(&mut self) -> Result<(), Error> {
        info!(url = %self.url, "opening registration form");
        self.driver().goto(&self.url).await?;
        self.wait_visible(&self.selectors.form).await?;
        self.wait_visible(&self.selectors.form_wrapper).await?;
        self.state = FormState::Unsubmitted;
        Ok(())
    }

    /// Close the fixed advertising banner if the page shows one.
    pub async fn dismiss_overlays(&self) -> Result<(), Error> {
        if self.driver().exists(&self.selectors.fixed_ban_close).await? {
            debug!("closing fixed banner");
            self.driver()
                .click(&self.selectors.fixed_ban_close, true)
                .await?;
        }
        Ok(())
    }

    /// Fill one logical group of fields. Groups whose data is absent are left untouched.
    pub async fn fill_section(
        &mut self,
        section: FormSection,
        data: &FormUserData,
    ) -> Result<(), Error> {
        self.begin_filling("fill_section")?;
        debug!(?section, "filling section");

        match section {
            FormSection::Identity => {
                self.interactions
                    .fill_text(&self.selectors.first_name, data.first_name())
                    .await?;
                self.interactions
                    .fill_text(&self.selectors.last_name, data.last_name())
                    .await?;
                if let Some(email) = data.email() {
                    self.interactions
                        .fill_text(&self.selectors.email, email)
                        .await?;
                }
            }
            FormSection::Demographics => {
                self.interactions
                    .set_checked(&Locator::css(data.gender().radio_selector()))
                    .await?;
                self.interactions
                    .fill_text(&self.selectors.mobile, data.mobile())
                    .await?;
                if let Some(date) = data.date_of_birth() {
                    let month = MONTHS[date.month0() as usize];
                    self.interactions
                        .set_date(&self.selectors.date_of_birth, date.year(), month, date.day())
                        .await?;
                }
            }
            FormSection::Academics => {
                for subject in data.subjects() {
                    self.interactions
                        .fill_text(&self.selectors.subjects_input, subject)
                        .await?;
                    let option =
                        Locator::css_with_text(self.selectors.subject_option_css.as_str(), subject);
                    self.wait_visible(&option).await.map_err(|e| match e {
                        Error::Timeout { .. } => Error::OptionNotFound {
                            target: self.selectors.subjects_input.clone(),
                            option: subject.clone(),
                        },
                        e => e,
                    })?;
                    self.driver().click(&option, true).await?;
                }
                for hobby in data.hobbies() {
                    self.interactions
                        .set_checked(&Locator::css(hobby.checkbox_selector()))
                        .await?;
                }
            }
            FormSection::Media => {
                if let Some(picture) = data.picture() {
                    self.interactions
                        .upload_file(&self.selectors.picture, picture)
                        .await?;
                }
            }
            FormSection::Address => {
                if let Some(address) = data.current_address() {
                    self.scroll_to(&self.selectors.current_address).await?;
                    self.interactions
                        .fill_text(&self.selectors.current_address, address)
                        .await?;
                }
            }
            FormSection::Locality => {
                if let Some(locality) = data.locality() {
                    self.scroll_to(&self.selectors.state).await?;
                    self.interactions
                        .choose_dropdown_option(&self.selectors.state, &locality.state)
                        .await?;
                    self.interactions
                        .choose_dropdown_option(&self.selectors.city, &locality.city)
                        .await?;
                }
            }
        }

        Ok(())
    }

    pub async fn fill_complete(&mut self, data: &FormUserData) -> Result<(), Error> {
        for section in FormSection::ALL.iter().copied() {
            self.fill_section(section, data).await?;
        }
        Ok(())
    }

    /// Fill only what the form requires: names, gender and mobile.
    pub async fn fill_required_fields(&mut self, data: &FormUserData) -> Result<(), Error> {
        self.begin_filling("fill_required_fields")?;

        self.interactions
            .fill_text(&self.selectors.first_name, data.first_name())
            .await?;
        self.interactions
            .fill_text(&self.selectors.last_name, data.last_name())
            .await?;
        self.interactions
            .set_checked(&Locator::css(data.gender().radio_selector()))
            .await?;
        self.interactions
            .fill_text(&self.selectors.mobile, data.mobile())
            .await
    }

    /// Activate the submit control. Whether the submission went through is for
    /// `verify_success` or `verify_not_submitted` to find out.
    pub async fn submit(&mut self) -> Result<(), Error> {
        self.expect_state("submit", &[FormState::Unsubmitted, FormState::Dismissed])?;

        self.scroll_to(&self.selectors.submit).await?;
        self.interactions.click(&self.selectors.submit).await?;
        self.transition(FormState::Submitted);
        Ok(())
    }

    pub async fn verify_success(&mut self) -> Result<(), Error> {
        self.expect_state("verify_success", &[FormState::Submitted])?;

        self.wait_visible(&self.selectors.confirmation)
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => {
                    Error::SubmissionNotConfirmed("the confirmation never appeared".into())
                }
                e => e,
            })?;

        let title = self
            .driver()
            .text_content(&self.selectors.confirmation_title)
            .await?;
        if !title.contains(CONFIRMATION_TITLE) {
            return Err(Error::SubmissionNotConfirmed(format!(
                "unexpected confirmation title \"{}\"",
                title
            )));
        }

        self.transition(FormState::Confirmed);
        Ok(())
    }

    /// Check every row of the confirmation table against `data`.
    pub async fn verify_submitted_data(&self, data: &FormUserData) -> Result<(), Error> {
        self.expect_state("verify_submitted_data", &[FormState::Confirmed])?;

        let cells = self
            .driver()
            .all_text_contents(&self.selectors.confirmation_table.descendants("td"))
            .await?;

        for (label, expected) in expected_rows(data) {
            let actual = row_value(&cells, label).ok_or_else(|| {
                Error::assertion(
                    format!("confirmation row \"{}\"", label),
                    expected.as_str(),
                    "<missing row>",
                )
            })?;

            if !actual.contains(expected.as_str()) {
                return Err(Error::assertion(
                    format!("confirmation row \"{}\"", label),
                    expected,
                    actual,
                ));
            }
        }

        Ok(())
    }

    /// Dismiss the confirmation and make sure it is really gone.
    pub async fn close_confirmation(&mut self) -> Result<(), Error> {
        self.expect_state("close_confirmation", &[FormState::Confirmed])?;

        self.interactions.click(&self.selectors.close_button).await?;

        let driver = self.driver();
        let confirmation = &self.selectors.confirmation;
        self.wait()
            .until("the confirmation to close", || async move {
                Ok(!driver.exists(confirmation).await?)
            })
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => {
                    Error::assertion("confirmation surface", "dismissed", "still present")
                }
                e => e,
            })?;

        self.transition(FormState::Dismissed);
        Ok(())
    }

    /// The confirmation must not show up, e.g. after submitting an incomplete form.
    pub async fn verify_not_submitted(&mut self) -> Result<(), Error> {
        self.expect_state("verify_not_submitted", &[FormState::Submitted])?;

        if self.driver().exists(&self.selectors.confirmation).await? {
            return Err(Error::assertion(
                "confirmation surface",
                "absent",
                "present",
            ));
        }

        self.transition(FormState::Unsubmitted);
        Ok(())
    }

    /// Required inputs left empty are outlined in red.
    pub async fn verify_required_field_errors(&self) -> Result<(), Error> {
        for field in &[
            &self.selectors.first_name,
            &self.selectors.last_name,
            &self.selectors.mobile,
        ] {
            self.wait_visible(field).await?;
            let color = self.driver().css_value(field, "border-color").await?;
            if color != INVALID_BORDER_COLOR {
                return Err(Error::assertion(
                    format!("border colour of {}", field),
                    INVALID_BORDER_COLOR,
                    color,
                ));
            }
        }

        Ok(())
    }

    async fn scroll_to(&self, locator: &Locator) -> Result<(), Error> {
        self.wait_exists(locator).await?;
        self.driver().scroll_into_view(locator).await
    }

    async fn wait_visible(&self, locator: &Locator) -> Result<(), Error> {
        let driver = self.driver();
        self.wait()
            .until(&format!("{} to be visible", locator), || {
                driver.is_visible(locator)
            })
            .await
    }

    async fn wait_exists(&self, locator: &Locator) -> Result<(), Error> {
        let driver = self.driver();
        self.wait()
            .until(&format!("{} to exist", locator), || driver.exists(locator))
            .await
    }

    fn begin_filling(&mut self, operation: &'static str) -> Result<(), Error> {
        self.expect_state(operation, &[FormState::Unsubmitted, FormState::Dismissed])?;
        if self.state == FormState::Dismissed {
            self.transition(FormState::Unsubmitted);
        }
        Ok(())
    }

    fn expect_state(&self, operation: &'static str, allowed: &[FormState]) -> Result<(), Error> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::UnexpectedFormState {
                operation,
                state: self.state.name(),
            })
        }
    }

    fn transition(&mut self, next: FormState) {
        info!(from = %self.state, to = %next, "form state changed");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_generator::TestDataGenerator,
        form_data::{Gender, Hobby},
        simulated::SimulatedRegistrationPage,
    };
    use async_trait::async_trait;
    use std::{path::Path, time::Duration};

    /// Simulated page that loses its connection when asked about subject suggestions.
    #[derive(Debug, Default)]
    struct BrokenSuggestionsPage {
        page: SimulatedRegistrationPage,
    }

    #[async_trait]
    impl BrowserDriver for BrokenSuggestionsPage {
        async fn goto(&self, url: &str) -> Result<(), Error> {
            self.page.goto(url).await
        }

        async fn exists(&self, locator: &Locator) -> Result<bool, Error> {
            self.page.exists(locator).await
        }

        async fn is_visible(&self, locator: &Locator) -> Result<bool, Error> {
            match locator {
                Locator::Text { css: Some(_), .. } => {
                    Err(Error::DriverError("connection lost".into()))
                }
                _ => self.page.is_visible(locator).await,
            }
        }

        async fn is_actionable(&self, locator: &Locator) -> Result<bool, Error> {
            self.page.is_actionable(locator).await
        }

        async fn clear(&self, locator: &Locator) -> Result<(), Error> {
            self.page.clear(locator).await
        }

        async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), Error> {
            self.page.type_text(locator, text).await
        }

        async fn click(&self, locator: &Locator, force: bool) -> Result<(), Error> {
            self.page.click(locator, force).await
        }

        async fn check(&self, locator: &Locator) -> Result<(), Error> {
            self.page.check(locator).await
        }

        async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), Error> {
            self.page.select_option(locator, label).await
        }

        async fn attach_file(&self, locator: &Locator, path: &Path) -> Result<(), Error> {
            self.page.attach_file(locator, path).await
        }

        async fn scroll_into_view(&self, locator: &Locator) -> Result<(), Error> {
            self.page.scroll_into_view(locator).await
        }

        async fn input_value(&self, locator: &Locator) -> Result<String, Error> {
            self.page.input_value(locator).await
        }

        async fn text_content(&self, locator: &Locator) -> Result<String, Error> {
            self.page.text_content(locator).await
        }

        async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>, Error> {
            self.page.all_text_contents(locator).await
        }

        async fn css_value(&self, locator: &Locator, property: &str) -> Result<String, Error> {
            self.page.css_value(locator, property).await
        }
    }

    fn configuration() -> HarnessConfiguration {
        let mut configuration = HarnessConfiguration::default();
        configuration.set_default_command_timeout(Duration::from_millis(300));
        configuration
    }

    #[test]
    fn test_expected_rows_skip_absent_fields() {
        let data = TestDataGenerator::with_seed(3).minimal_form_user().unwrap();
        let labels = expected_rows(&data)
            .into_iter()
            .map(|(label, _)| label)
            .collect::<Vec<_>>();

        assert_eq!(labels, vec!["Student Name", "Gender", "Mobile"]);
    }

    #[test]
    fn test_expected_rows_join_composite_fields() {
        let data = TestDataGenerator::with_seed(3).form_user().unwrap();
        let rows = expected_rows(&data);
        let value = |label: &str| {
            rows.iter()
                .find(|(row, _)| *row == label)
                .map(|(_, value)| value.clone())
        };

        assert_eq!(value("Date of Birth"), Some(String::from("15 July,1990")));
        assert_eq!(value("Subjects"), Some(String::from("Maths, Physics")));
        assert_eq!(value("Hobbies"), Some(String::from("Sports, Reading")));
        assert_eq!(
            value("State and City"),
            Some(String::from("Uttar Pradesh Lucknow"))
        );
    }

    #[test]
    fn test_row_value() {
        let cells = vec![
            String::from("Student Name"),
            String::from(" Jane Doe "),
            String::from("Mobile"),
        ];

        assert_eq!(row_value(&cells, "Student Name"), Some("Jane Doe"));
        assert_eq!(row_value(&cells, "Mobile"), None);
        assert_eq!(row_value(&cells, "Gender"), None);
    }

    #[tokio::test]
    async fn test_complete_registration_round_trip() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(11).form_user().unwrap();

        form.visit().await.unwrap();
        form.dismiss_overlays().await.unwrap();
        form.fill_complete(&data).await.unwrap();

        assert_eq!(
            page.checked_labels(),
            vec![
                String::from("Male"),
                String::from("Sports"),
                String::from("Reading")
            ]
        );

        form.submit().await.unwrap();
        form.verify_success().await.unwrap();
        form.verify_submitted_data(&data).await.unwrap();
        assert_eq!(form.state(), FormState::Confirmed);

        form.close_confirmation().await.unwrap();
        assert_eq!(form.state(), FormState::Dismissed);
    }

    #[tokio::test]
    async fn test_below_the_fold_sections_are_scrolled_into_view() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(5).form_user().unwrap();

        form.visit().await.unwrap();
        form.fill_section(FormSection::Address, &data).await.unwrap();
        form.fill_section(FormSection::Locality, &data).await.unwrap();

        let actions = page.actions();
        assert!(actions.contains(&String::from("scroll `#currentAddress`")));
        assert!(actions.contains(&String::from("scroll `#state`")));
        assert!(FormSection::Locality.is_below_the_fold());
        assert!(!FormSection::Identity.is_below_the_fold());
    }

    #[tokio::test]
    async fn test_verify_before_submit_is_rejected() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);

        form.visit().await.unwrap();

        assert!(matches!(
            form.verify_success().await,
            Err(Error::UnexpectedFormState {
                operation: "verify_success",
                state: "unsubmitted"
            })
        ));
        assert!(matches!(
            form.close_confirmation().await,
            Err(Error::UnexpectedFormState { .. })
        ));
    }

    #[tokio::test]
    async fn test_filling_a_confirmed_form_is_rejected() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(2).minimal_form_user().unwrap();

        form.visit().await.unwrap();
        form.fill_required_fields(&data).await.unwrap();
        form.submit().await.unwrap();
        form.verify_success().await.unwrap();

        assert!(matches!(
            form.fill_required_fields(&data).await,
            Err(Error::UnexpectedFormState {
                operation: "fill_required_fields",
                state: "confirmed"
            })
        ));
    }

    #[tokio::test]
    async fn test_empty_submission_marks_required_fields() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);

        form.visit().await.unwrap();
        form.submit().await.unwrap();
        form.verify_not_submitted().await.unwrap();
        form.verify_required_field_errors().await.unwrap();

        assert_eq!(form.state(), FormState::Unsubmitted);
    }

    #[tokio::test]
    async fn test_missing_confirmation_is_reported() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);

        form.visit().await.unwrap();
        form.submit().await.unwrap();

        assert!(matches!(
            form.verify_success().await,
            Err(Error::SubmissionNotConfirmed(_))
        ));
    }

    #[tokio::test]
    async fn test_form_can_be_refilled_after_closing_the_confirmation() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let mut generator = TestDataGenerator::with_seed(9);

        form.visit().await.unwrap();
        for gender in &[Gender::Female, Gender::Other] {
            let data = generator
                .minimal_form_user()
                .unwrap()
                .to_builder()
                .with_gender(*gender)
                .with_hobbies(vec![Hobby::Music])
                .build()
                .unwrap();

            form.fill_required_fields(&data).await.unwrap();
            form.fill_section(FormSection::Academics, &data)
                .await
                .unwrap();
            form.submit().await.unwrap();
            form.verify_success().await.unwrap();
            form.verify_submitted_data(&data).await.unwrap();
            form.close_confirmation().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_subject_suggestion_failures_are_not_relabelled() {
        let page = BrokenSuggestionsPage::default();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(4).form_user().unwrap();

        form.visit().await.unwrap();

        assert!(matches!(
            form.fill_section(FormSection::Academics, &data).await,
            Err(Error::DriverError(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject_is_reported_as_missing_option() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(4)
            .form_user()
            .unwrap()
            .to_builder()
            .with_subjects(vec!["Astrology"])
            .build()
            .unwrap();

        form.visit().await.unwrap();

        match form.fill_section(FormSection::Academics, &data).await {
            Err(Error::OptionNotFound { option, .. }) => assert_eq!(option, "Astrology"),
            other => panic!("Expected a missing option, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hidden_subject_input_is_not_interactable() {
        let page = SimulatedRegistrationPage::new();
        let configuration = configuration();
        let mut form = RegistrationForm::new(&page, &configuration);
        let data = TestDataGenerator::with_seed(4).form_user().unwrap();

        form.visit().await.unwrap();
        page.hide("#subjectsInput");

        assert!(matches!(
            form.fill_section(FormSection::Academics, &data).await,
            Err(Error::ElementNotInteractable(_))
        ));
    }
}
