use crate::{
    error::Error,
    form_data::{ApiUserPayload, FormUserData, Gender, Hobby, Locality},
};
use chrono::{NaiveDate, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

pub const DEFAULT_PICTURE: &str = "test-image.jpg";

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Emily", "Robert", "Lisa", "James", "Maria",
    "William", "Jennifer", "Richard", "Linda", "Joseph", "Elizabeth", "Thomas", "Barbara",
    "Christopher", "Susan", "Daniel", "Jessica", "Matthew", "Karen", "Anthony", "Nancy", "Mark",
    "Betty", "Donald", "Helen", "Steven", "Sandra", "Paul", "Donna", "Andrew", "Carol", "Joshua",
    "Ruth", "Kenneth", "Sharon", "Kevin", "Michelle",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell",
];

const STREET_NAMES: &[&str] = &[
    "Main Street",
    "Oak Avenue",
    "Park Lane",
    "Cedar Drive",
    "Elm Street",
    "Maple Avenue",
    "Pine Road",
    "First Street",
    "Second Avenue",
    "Third Street",
    "Washington Street",
    "Lincoln Avenue",
    "Jefferson Road",
    "Madison Drive",
    "Jackson Street",
    "Franklin Avenue",
    "Roosevelt Road",
    "Kennedy Drive",
];

const CITIES: &[&str] = &[
    "Springfield",
    "Franklin",
    "Georgetown",
    "Salem",
    "Fairview",
    "Madison",
    "Oakland",
    "Bristol",
    "Clinton",
    "Greenville",
];

/// Source of randomized but valid domain objects.
///
/// Seed it with `with_seed` to get the same sequence of names, numbers and addresses on
/// every run; emails still carry the current timestamp.
#[derive(Debug)]
pub struct TestDataGenerator {
    rng: StdRng,
}

impl TestDataGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn first_name(&mut self) -> &'static str {
        pick(&mut self.rng, FIRST_NAMES)
    }

    pub fn last_name(&mut self) -> &'static str {
        pick(&mut self.rng, LAST_NAMES)
    }

    /// `first.last<n><millis>@example.com`, lower-cased.
    pub fn email(&mut self, first_name: &str, last_name: &str) -> String {
        let random_number: u32 = self.rng.gen_range(0..1000);
        format!(
            "{}.{}{}{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            random_number,
            Utc::now().timestamp_millis()
        )
    }

    /// Ten digits, never starting with zero.
    pub fn phone_number(&mut self) -> String {
        let number: u64 = self.rng.gen_range(1_000_000_000..=9_999_999_999);
        number.to_string()
    }

    pub fn address(&mut self) -> String {
        let street_number: u32 = self.rng.gen_range(1..=9999);
        let street = pick(&mut self.rng, STREET_NAMES);
        let city = pick(&mut self.rng, CITIES);
        format!("{} {}, {}", street_number, street, city)
    }

    /// A complete registration with every optional field set.
    pub fn form_user(&mut self) -> Result<FormUserData, Error> {
        let first_name = self.first_name();
        let last_name = self.last_name();
        let email = self.email(first_name, last_name);
        let mobile = self.phone_number();
        let address = self.address();
        let date_of_birth = NaiveDate::from_ymd_opt(1990, 7, 15)
            .ok_or_else(|| Error::InvalidFormData("invalid date of birth".into()))?;

        FormUserData::builder(first_name, last_name, Gender::Male, mobile)
            .with_email(email)
            .with_date_of_birth(date_of_birth)
            .with_subjects(vec!["Maths", "Physics"])
            .with_hobbies(vec![Hobby::Sports, Hobby::Reading])
            .with_picture(DEFAULT_PICTURE)
            .with_current_address(address)
            .with_locality(Locality::new("Uttar Pradesh", "Lucknow"))
            .build()
    }

    pub fn form_user_with_gender(&mut self, gender: Gender) -> Result<FormUserData, Error> {
        self.form_user()?.to_builder().with_gender(gender).build()
    }

    /// Only the fields the form requires: names, gender and mobile.
    pub fn minimal_form_user(&mut self) -> Result<FormUserData, Error> {
        let first_name = self.first_name();
        let last_name = self.last_name();
        let mobile = self.phone_number();

        FormUserData::builder(first_name, last_name, Gender::Female, mobile).build()
    }

    pub fn api_user(&mut self) -> ApiUserPayload {
        let timestamp = Utc::now().timestamp_millis();
        ApiUserPayload {
            name: format!("Test User {}", timestamp),
            job: format!("QA Engineer {}", timestamp),
            email: format!("test.user{}@example.com", timestamp),
            age: self.rng.gen_range(20..70),
        }
    }
}

impl Default for TestDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn pick(rng: &mut StdRng, pool: &[&'static str]) -> &'static str {
    // pools are non-empty constants
    pool.choose(rng).copied().unwrap_or(pool[0])
}
