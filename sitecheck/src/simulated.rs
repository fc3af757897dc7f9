//! In-memory rendition of the demoqa student registration page.
//!
//! Scenarios run against it the same way they run against a real browser, which keeps the
//! page-object layer testable without network access or a browser binary.

use crate::{
    driver::{BrowserDriver, Locator},
    error::Error,
    form_data::{Gender, Hobby},
    form_page::{CONFIRMATION_TITLE, FORM_PATH, INVALID_BORDER_COLOR},
};
use async_trait::async_trait;
use chrono::{Datelike, Local, Month, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

pub const VALID_BORDER_COLOR: &str = "rgb(40, 167, 69)";
pub const NEUTRAL_BORDER_COLOR: &str = "rgb(206, 212, 218)";

const SUBJECT_OPTION: &str = ".subjects-auto-complete__option";
const CONFIRMATION_CELLS: &str = ".table-responsive td";

const TEXT_INPUTS: &[&str] = &[
    "#firstName",
    "#lastName",
    "#userEmail",
    "#userNumber",
    "#currentAddress",
    "#subjectsInput",
];

const REQUIRED_INPUTS: &[&str] = &["#firstName", "#lastName", "#userNumber"];

const SUBJECTS: &[&str] = &[
    "Hindi",
    "English",
    "Maths",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Commerce",
    "Accounting",
    "Economics",
    "Arts",
    "Social Studies",
    "History",
    "Civics",
];

const LOCALITIES: &[(&str, &[&str])] = &[
    ("NCR", &["Delhi", "Gurgaon", "Noida"]),
    ("Uttar Pradesh", &["Agra", "Lucknow", "Merrut"]),
    ("Haryana", &["Karnal", "Panipat"]),
    ("Rajasthan", &["Jaipur", "Jaiselmer"]),
];

lazy_static! {
    static ref DAY_CELL_REGEX: Regex = Regex::new(
        r"^\.react-datepicker__day--0(\d{2}):not\(\.react-datepicker__day--outside-month\)$"
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Form,
    FormWrapper,
    FixedBanClose,
    TextInput(&'static str),
    DateInput,
    GenderRadio(&'static str),
    HobbyCheckbox(&'static str),
    Picture,
    StateSelect,
    CitySelect,
    YearSelect,
    MonthSelect,
    DayCell(u32),
    Submit,
    Confirmation,
    ConfirmationTitle,
    ConfirmationCells,
    CloseButton,
    MenuOption(String),
    SubjectOption(String),
}

#[derive(Debug, Default)]
struct PageState {
    loaded: bool,
    banner_visible: bool,
    values: HashMap<&'static str, String>,
    subject_query: String,
    subjects: Vec<String>,
    gender: Option<&'static str>,
    hobbies: Vec<&'static str>,
    picture: Option<String>,
    date_of_birth: Option<NaiveDate>,
    calendar: Option<(i32, u32)>,
    state_menu_open: bool,
    city_menu_open: bool,
    selected_state: Option<String>,
    selected_city: Option<String>,
    submit_attempted: bool,
    confirmation: Option<Vec<(&'static str, String)>>,
    hidden: HashSet<String>,
    actions: Vec<String>,
}

impl PageState {
    fn reset_form(&mut self) {
        self.banner_visible = true;
        self.values.clear();
        self.subject_query.clear();
        self.subjects.clear();
        self.gender = None;
        self.hobbies.clear();
        self.picture = None;
        self.date_of_birth = Some(Local::now().date_naive());
        self.calendar = None;
        self.state_menu_open = false;
        self.city_menu_open = false;
        self.selected_state = None;
        self.selected_city = None;
        self.submit_attempted = false;
        self.confirmation = None;
    }

    fn resolve(&self, locator: &Locator) -> Option<Element> {
        if !self.loaded {
            return None;
        }

        let element = match locator {
            Locator::Css(css) => resolve_css(css)?,
            Locator::Text { css: None, text } => Element::MenuOption(text.clone()),
            Locator::Text {
                css: Some(css),
                text,
            } if css == SUBJECT_OPTION => Element::SubjectOption(text.clone()),
            Locator::Text { .. } => return None,
        };

        if self.is_present(&element) {
            Some(element)
        } else {
            None
        }
    }

    fn is_present(&self, element: &Element) -> bool {
        match element {
            Element::FixedBanClose => self.banner_visible,
            Element::YearSelect | Element::MonthSelect => self.calendar.is_some(),
            Element::DayCell(day) => match self.calendar {
                Some((year, month)) => NaiveDate::from_ymd_opt(year, month, *day).is_some(),
                None => false,
            },
            Element::Confirmation
            | Element::ConfirmationTitle
            | Element::ConfirmationCells
            | Element::CloseButton => self.confirmation.is_some(),
            Element::MenuOption(text) => {
                let text = text.as_str();
                (self.state_menu_open && LOCALITIES.iter().any(|(state, _)| *state == text))
                    || (self.city_menu_open && self.cities().contains(&text))
            }
            Element::SubjectOption(text) => {
                let query = self.subject_query.to_lowercase();
                !query.is_empty()
                    && !self.subjects.contains(text)
                    && SUBJECTS.iter().any(|subject| {
                        *subject == text.as_str() && subject.to_lowercase().contains(&query)
                    })
            }
            _ => true,
        }
    }

    fn is_visible(&self, locator: &Locator) -> bool {
        self.resolve(locator).is_some() && !self.hidden.contains(hide_key(locator))
    }

    fn is_actionable(&self, locator: &Locator) -> bool {
        match self.resolve(locator) {
            // covered by their styled labels
            Some(Element::GenderRadio(_)) | Some(Element::HobbyCheckbox(_)) => false,
            Some(Element::CitySelect) => {
                self.selected_state.is_some() && self.is_visible(locator)
            }
            Some(_) => self.is_visible(locator),
            None => false,
        }
    }

    fn cities(&self) -> &'static [&'static str] {
        self.selected_state
            .as_deref()
            .and_then(|selected| LOCALITIES.iter().find(|(state, _)| *state == selected))
            .map(|(_, cities)| *cities)
            .unwrap_or(&[])
    }

    fn value(&self, input: &str) -> &str {
        self.values.get(input).map(String::as_str).unwrap_or("")
    }

    fn is_valid(&self, input: &str) -> bool {
        let value = self.value(input);
        match input {
            "#userNumber" => value.len() == 10 && value.chars().all(|c| c.is_ascii_digit()),
            _ => !value.trim().is_empty(),
        }
    }

    fn activate(&mut self, element: Element) {
        match element {
            Element::FixedBanClose => self.banner_visible = false,
            Element::DateInput => {
                let shown = self.date_of_birth.unwrap_or_else(|| Local::now().date_naive());
                self.calendar = Some((shown.year(), shown.month()));
            }
            Element::GenderRadio(label) => self.gender = Some(label),
            Element::HobbyCheckbox(label) => {
                if self.hobbies.contains(&label) {
                    self.hobbies.retain(|hobby| *hobby != label);
                } else {
                    self.hobbies.push(label);
                }
            }
            Element::StateSelect => {
                self.state_menu_open = true;
                self.city_menu_open = false;
            }
            Element::CitySelect => {
                if self.selected_state.is_some() {
                    self.city_menu_open = true;
                    self.state_menu_open = false;
                }
            }
            Element::DayCell(day) => {
                if let Some((year, month)) = self.calendar.take() {
                    self.date_of_birth = NaiveDate::from_ymd_opt(year, month, day);
                }
            }
            Element::MenuOption(text) => {
                if self.state_menu_open {
                    self.selected_state = Some(text);
                    self.selected_city = None;
                    self.state_menu_open = false;
                } else if self.city_menu_open {
                    self.selected_city = Some(text);
                    self.city_menu_open = false;
                }
            }
            Element::SubjectOption(text) => {
                self.subjects.push(text);
                self.subject_query.clear();
                self.values.insert("#subjectsInput", String::new());
            }
            Element::Submit => self.submit(),
            Element::CloseButton => self.reset_form(),
            _ => (),
        }
    }

    fn submit(&mut self) {
        self.submit_attempted = true;

        let complete =
            self.gender.is_some() && REQUIRED_INPUTS.iter().all(|input| self.is_valid(input));
        if complete {
            self.confirmation = Some(self.confirmation_rows());
        }
    }

    fn confirmation_rows(&self) -> Vec<(&'static str, String)> {
        let locality = match (&self.selected_state, &self.selected_city) {
            (Some(state), Some(city)) => format!("{} {}", state, city),
            (Some(state), None) => state.clone(),
            _ => String::new(),
        };

        vec![
            (
                "Student Name",
                format!("{} {}", self.value("#firstName"), self.value("#lastName")),
            ),
            ("Student Email", self.value("#userEmail").into()),
            ("Gender", self.gender.unwrap_or("").into()),
            ("Mobile", self.value("#userNumber").into()),
            (
                "Date of Birth",
                self.date_of_birth
                    .map(|date| date.format("%d %B,%Y").to_string())
                    .unwrap_or_default(),
            ),
            ("Subjects", self.subjects.join(", ")),
            ("Hobbies", self.hobbies.join(", ")),
            ("Picture", self.picture.clone().unwrap_or_default()),
            ("Address", self.value("#currentAddress").into()),
            ("State and City", locality),
        ]
    }

    fn text_of(&self, element: &Element) -> String {
        match element {
            Element::TextInput(input) => self.value(input).into(),
            Element::ConfirmationTitle | Element::Confirmation => CONFIRMATION_TITLE.into(),
            Element::MenuOption(text) | Element::SubjectOption(text) => text.clone(),
            Element::GenderRadio(label) | Element::HobbyCheckbox(label) => (*label).into(),
            Element::Submit => String::from("Submit"),
            Element::CloseButton => String::from("Close"),
            Element::DayCell(day) => day.to_string(),
            _ => String::new(),
        }
    }
}

fn resolve_css(css: &str) -> Option<Element> {
    let element = match css {
        "#userForm" => Element::Form,
        ".practice-form-wrapper" => Element::FormWrapper,
        "#close-fixedban" => Element::FixedBanClose,
        "#dateOfBirthInput" => Element::DateInput,
        "#uploadPicture" => Element::Picture,
        "#state" => Element::StateSelect,
        "#city" => Element::CitySelect,
        ".react-datepicker__year-select" => Element::YearSelect,
        ".react-datepicker__month-select" => Element::MonthSelect,
        "#submit" => Element::Submit,
        ".modal-content" => Element::Confirmation,
        "#example-modal-sizes-title-lg" => Element::ConfirmationTitle,
        CONFIRMATION_CELLS => Element::ConfirmationCells,
        "#closeLargeModal" => Element::CloseButton,
        _ => {
            if let Some(input) = TEXT_INPUTS.iter().find(|input| **input == css) {
                Element::TextInput(*input)
            } else if let Some(gender) = Gender::ALL.iter().find(|g| g.radio_selector() == css) {
                Element::GenderRadio(gender.label())
            } else if let Some(hobby) = Hobby::ALL.iter().find(|h| h.checkbox_selector() == css) {
                Element::HobbyCheckbox(hobby.label())
            } else {
                let captures = DAY_CELL_REGEX.captures(css)?;
                Element::DayCell(captures[1].parse().ok()?)
            }
        }
    };

    Some(element)
}

fn hide_key(locator: &Locator) -> &str {
    match locator {
        Locator::Css(css) => css,
        Locator::Text { text, .. } => text,
    }
}

/// A `BrowserDriver` that renders the registration form from memory.
#[derive(Debug, Default)]
pub struct SimulatedRegistrationPage {
    state: Mutex<PageState>,
}

impl SimulatedRegistrationPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide the element addressed by `selector` (a CSS selector, or the text of a text locator).
    pub fn hide(&self, selector: &str) {
        self.state().hidden.insert(selector.into());
    }

    /// Labels of the checked radio and checkboxes: gender first, hobbies in click order.
    pub fn checked_labels(&self) -> Vec<String> {
        let state = self.state();
        state
            .gender
            .iter()
            .chain(state.hobbies.iter())
            .map(|label| String::from(*label))
            .collect()
    }

    /// Every click, check, upload and scroll so far, e.g. "click `#submit`".
    pub fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BrowserDriver for SimulatedRegistrationPage {
    async fn goto(&self, url: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.actions.push(format!("goto {}", url));
        state.loaded = url.trim_end_matches('/').ends_with(FORM_PATH);
        if state.loaded {
            state.reset_form();
        }
        Ok(())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self.state().resolve(locator).is_some())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self.state().is_visible(locator))
    }

    async fn is_actionable(&self, locator: &Locator) -> Result<bool, Error> {
        Ok(self.state().is_actionable(locator))
    }

    async fn clear(&self, locator: &Locator) -> Result<(), Error> {
        let mut state = self.state();
        match state.resolve(locator) {
            Some(Element::TextInput(input)) => {
                if input == "#subjectsInput" {
                    state.subject_query.clear();
                }
                state.values.insert(input, String::new());
                Ok(())
            }
            Some(_) => Err(Error::DriverError(format!("{} is not a text input", locator))),
            None => Err(Error::ElementNotFound(locator.clone())),
        }
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<(), Error> {
        let mut state = self.state();
        if !state.is_actionable(locator) {
            return Err(match state.resolve(locator) {
                Some(_) => Error::ElementNotInteractable(locator.clone()),
                None => Error::ElementNotFound(locator.clone()),
            });
        }

        match state.resolve(locator) {
            Some(Element::TextInput(input)) => {
                if input == "#subjectsInput" {
                    state.subject_query.push_str(text);
                }
                let value = state.values.entry(input).or_insert_with(String::new);
                value.push_str(text);
                if input == "#userNumber" {
                    // maxlength="10"
                    value.truncate(10);
                }
                Ok(())
            }
            _ => Err(Error::DriverError(format!("{} does not accept typing", locator))),
        }
    }

    async fn click(&self, locator: &Locator, force: bool) -> Result<(), Error> {
        let mut state = self.state();
        let element = state
            .resolve(locator)
            .ok_or_else(|| Error::ElementNotFound(locator.clone()))?;

        if !force && !state.is_actionable(locator) {
            return Err(Error::ElementNotInteractable(locator.clone()));
        }

        state.actions.push(format!("click {}", locator));
        state.activate(element);
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<(), Error> {
        let mut state = self.state();
        match state.resolve(locator) {
            Some(Element::GenderRadio(label)) => state.gender = Some(label),
            Some(Element::HobbyCheckbox(label)) => {
                if !state.hobbies.contains(&label) {
                    state.hobbies.push(label);
                }
            }
            Some(_) => {
                return Err(Error::DriverError(format!(
                    "{} is not a checkbox or radio",
                    locator
                )))
            }
            None => return Err(Error::ElementNotFound(locator.clone())),
        }

        state.actions.push(format!("check {}", locator));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), Error> {
        let mut state = self.state();
        let (year, month) = match (state.resolve(locator), state.calendar) {
            (Some(_), Some(shown)) => shown,
            _ => return Err(Error::ElementNotFound(locator.clone())),
        };

        let unknown = || Error::DriverError(format!("{} has no option \"{}\"", locator, label));
        let shown = match state.resolve(locator) {
            Some(Element::YearSelect) => (label.parse::<i32>().map_err(|_| unknown())?, month),
            Some(Element::MonthSelect) => {
                let month = label.parse::<Month>().map_err(|_| unknown())?;
                (year, month.number_from_month())
            }
            _ => return Err(Error::DriverError(format!("{} is not a select", locator))),
        };

        state.calendar = Some(shown);
        Ok(())
    }

    async fn attach_file(&self, locator: &Locator, path: &Path) -> Result<(), Error> {
        let mut state = self.state();
        match state.resolve(locator) {
            Some(Element::Picture) => {
                state.picture = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                state.actions.push(format!("upload {}", path.display()));
                Ok(())
            }
            Some(_) => Err(Error::DriverError(format!("{} is not a file input", locator))),
            None => Err(Error::ElementNotFound(locator.clone())),
        }
    }

    async fn scroll_into_view(&self, locator: &Locator) -> Result<(), Error> {
        let mut state = self.state();
        if state.resolve(locator).is_none() {
            return Err(Error::ElementNotFound(locator.clone()));
        }
        state.actions.push(format!("scroll {}", locator));
        Ok(())
    }

    async fn input_value(&self, locator: &Locator) -> Result<String, Error> {
        let state = self.state();
        match state.resolve(locator) {
            Some(Element::TextInput(input)) => Ok(state.value(input).into()),
            Some(Element::DateInput) => Ok(state
                .date_of_birth
                .map(|date| date.format("%d %b %Y").to_string())
                .unwrap_or_default()),
            Some(_) => Err(Error::DriverError(format!("{} has no value", locator))),
            None => Err(Error::ElementNotFound(locator.clone())),
        }
    }

    async fn text_content(&self, locator: &Locator) -> Result<String, Error> {
        let state = self.state();
        let element = state
            .resolve(locator)
            .ok_or_else(|| Error::ElementNotFound(locator.clone()))?;
        Ok(state.text_of(&element))
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>, Error> {
        let state = self.state();
        let texts = match state.resolve(locator) {
            Some(Element::ConfirmationCells) => state
                .confirmation
                .iter()
                .flatten()
                .flat_map(|(label, value)| vec![String::from(*label), value.clone()])
                .collect(),
            Some(element) => vec![state.text_of(&element)],
            None => Vec::new(),
        };
        Ok(texts)
    }

    async fn css_value(&self, locator: &Locator, property: &str) -> Result<String, Error> {
        let state = self.state();
        let input = match state.resolve(locator) {
            Some(Element::TextInput(input)) => input,
            Some(_) => return Ok(String::new()),
            None => return Err(Error::ElementNotFound(locator.clone())),
        };

        if property != "border-color" {
            return Ok(String::new());
        }

        let color = if !state.submit_attempted || !REQUIRED_INPUTS.contains(&input) {
            NEUTRAL_BORDER_COLOR
        } else if state.is_valid(input) {
            VALID_BORDER_COLOR
        } else {
            INVALID_BORDER_COLOR
        };
        Ok(color.into())
    }
}
