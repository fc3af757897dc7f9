//! Scenarios for the DemoQA student registration form.
//!
//! Every scenario opens the form itself and works with any `BrowserDriver`.

use crate::error::Error;
use sitecheck::{
    BrowserDriver, FormUserData, Gender, HarnessConfiguration, Hobby, RegistrationForm,
    TestDataGenerator,
};
use tracing::info;

async fn open_form<'a, D: BrowserDriver + ?Sized>(
    driver: &'a D,
    configuration: &'a HarnessConfiguration,
) -> Result<RegistrationForm<'a, D>, Error> {
    let mut form = RegistrationForm::new(driver, configuration);
    form.visit().await?;
    form.dismiss_overlays().await?;
    Ok(form)
}

/// Submit the form and check that the confirmation echoes `data`.
async fn submit_and_confirm<D: BrowserDriver + ?Sized>(
    form: &mut RegistrationForm<'_, D>,
    data: &FormUserData,
) -> Result<(), Error> {
    form.submit().await?;
    form.verify_success().await?;
    form.verify_submitted_data(data).await?;
    form.close_confirmation().await?;
    Ok(())
}

pub async fn complete_registration<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let data = TestDataGenerator::new().form_user()?;
    let mut form = open_form(driver, configuration).await?;

    form.fill_complete(&data).await?;
    submit_and_confirm(&mut form, &data).await
}

pub async fn minimal_registration<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let data = TestDataGenerator::new().minimal_form_user()?;
    let mut form = open_form(driver, configuration).await?;

    form.fill_required_fields(&data).await?;
    submit_and_confirm(&mut form, &data).await
}

pub async fn empty_submission_is_refused<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let mut form = open_form(driver, configuration).await?;

    form.submit().await?;
    form.verify_not_submitted().await?;
    form.verify_required_field_errors().await?;
    Ok(())
}

pub async fn every_gender_is_accepted<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let mut generator = TestDataGenerator::new();

    for gender in Gender::ALL.iter().copied() {
        info!(gender = gender.label(), "registering");
        let data = generator.form_user_with_gender(gender)?;
        let mut form = open_form(driver, configuration).await?;

        form.fill_complete(&data).await?;
        submit_and_confirm(&mut form, &data).await?;
    }

    Ok(())
}

pub async fn several_subjects_are_accepted<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let data = TestDataGenerator::new()
        .form_user()?
        .to_builder()
        .with_subjects(vec!["Maths", "Physics", "Chemistry", "English"])
        .build()?;
    let mut form = open_form(driver, configuration).await?;

    form.fill_complete(&data).await?;
    submit_and_confirm(&mut form, &data).await
}

pub async fn every_hobby_is_accepted<D: BrowserDriver + ?Sized>(
    driver: &D,
    configuration: &HarnessConfiguration,
) -> Result<(), Error> {
    let data = TestDataGenerator::new()
        .form_user()?
        .to_builder()
        .with_hobbies(Hobby::ALL.iter().copied())
        .build()?;
    let mut form = open_form(driver, configuration).await?;

    form.fill_complete(&data).await?;
    submit_and_confirm(&mut form, &data).await
}
