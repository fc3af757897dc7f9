use crate::{error::Error, validators};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn radio_selector(self) -> &'static str {
        match self {
            Gender::Male => "#gender-radio-1",
            Gender::Female => "#gender-radio-2",
            Gender::Other => "#gender-radio-3",
        }
    }
}

/// Ordered by position on the form, which is also the order the confirmation lists them in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hobby {
    Sports,
    Reading,
    Music,
}

impl Hobby {
    pub const ALL: [Hobby; 3] = [Hobby::Sports, Hobby::Reading, Hobby::Music];

    pub fn label(self) -> &'static str {
        match self {
            Hobby::Sports => "Sports",
            Hobby::Reading => "Reading",
            Hobby::Music => "Music",
        }
    }

    pub fn checkbox_selector(self) -> &'static str {
        match self {
            Hobby::Sports => "#hobbies-checkbox-1",
            Hobby::Reading => "#hobbies-checkbox-2",
            Hobby::Music => "#hobbies-checkbox-3",
        }
    }
}

macro_rules! labelled_enum_impls {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|value| value.label().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| Error::InvalidFormData(format!("unknown {} \"{}\"", $what, s)))
            }
        }
    };
}

labelled_enum_impls!(Gender, "gender");
labelled_enum_impls!(Hobby, "hobby");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    pub state: String,
    pub city: String,
}

impl Locality {
    pub fn new<S1: Into<String>, S2: Into<String>>(state: S1, city: S2) -> Self {
        Self {
            state: state.into(),
            city: city.into(),
        }
    }
}

/// One complete submission of the registration form. Built through `FormUserDataBuilder` and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormUserData {
    first_name: String,
    last_name: String,
    email: Option<String>,
    gender: Gender,
    mobile: String,
    date_of_birth: Option<NaiveDate>,
    subjects: Vec<String>,
    hobbies: BTreeSet<Hobby>,
    picture: Option<String>,
    current_address: Option<String>,
    locality: Option<Locality>,
}

impl FormUserData {
    pub fn builder<S1, S2, S3>(
        first_name: S1,
        last_name: S2,
        gender: Gender,
        mobile: S3,
    ) -> FormUserDataBuilder
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        FormUserDataBuilder::new(first_name, last_name, gender, mobile)
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn hobbies(&self) -> &BTreeSet<Hobby> {
        &self.hobbies
    }

    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    pub fn current_address(&self) -> Option<&str> {
        self.current_address.as_deref()
    }

    pub fn locality(&self) -> Option<&Locality> {
        self.locality.as_ref()
    }

    /// A builder pre-filled with this data, for deriving variants within one scenario.
    pub fn to_builder(&self) -> FormUserDataBuilder {
        FormUserDataBuilder { data: self.clone() }
    }
}

#[derive(Debug, Clone)]
pub struct FormUserDataBuilder {
    data: FormUserData,
}

impl FormUserDataBuilder {
    pub fn new<S1, S2, S3>(first_name: S1, last_name: S2, gender: Gender, mobile: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            data: FormUserData {
                first_name: first_name.into(),
                last_name: last_name.into(),
                email: None,
                gender,
                mobile: mobile.into(),
                date_of_birth: None,
                subjects: Vec::new(),
                hobbies: BTreeSet::new(),
                picture: None,
                current_address: None,
                locality: None,
            },
        }
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.data.email = Some(email.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.data.gender = gender;
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.data.date_of_birth = Some(date);
        self
    }

    pub fn with_subjects<S: Into<String>, I: IntoIterator<Item = S>>(mut self, subjects: I) -> Self {
        self.data.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_hobbies<I: IntoIterator<Item = Hobby>>(mut self, hobbies: I) -> Self {
        self.data.hobbies = hobbies.into_iter().collect();
        self
    }

    pub fn with_picture<S: Into<String>>(mut self, file_name: S) -> Self {
        self.data.picture = Some(file_name.into());
        self
    }

    pub fn with_current_address<S: Into<String>>(mut self, address: S) -> Self {
        self.data.current_address = Some(address.into());
        self
    }

    pub fn with_locality(mut self, locality: Locality) -> Self {
        self.data.locality = Some(locality);
        self
    }

    /// Validate and freeze the data.
    ///
    /// # Errors
    /// `Error::InvalidFormData` for empty names, a mobile number that isn't 10 digits or a
    /// malformed email.
    pub fn build(self) -> Result<FormUserData, Error> {
        let data = self.data;

        if data.first_name.trim().is_empty() || data.last_name.trim().is_empty() {
            return Err(Error::InvalidFormData(
                "first and last name are required".into(),
            ));
        }

        if data.mobile.len() != 10 || !data.mobile.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidFormData(format!(
                "mobile \"{}\" should be 10 digits",
                data.mobile
            )));
        }

        if let Some(email) = &data.email {
            if !validators::is_email_shaped(email) {
                return Err(Error::InvalidFormData(format!(
                    "email \"{}\" is malformed",
                    email
                )));
            }
        }

        if data.subjects.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidFormData("subjects can't be blank".into()));
        }

        Ok(data)
    }
}

/// Body of a user creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUserPayload {
    pub name: String,
    pub job: String,
    pub email: String,
    pub age: u32,
}
