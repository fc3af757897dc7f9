pub mod configuration;
mod data;
mod data_generator;
mod driver;
mod error;
mod form_data;
mod form_page;
mod http_client;
mod interactions;
pub mod logging;
mod request_executor;
mod simulated;
mod stub_server;
mod util;
pub mod validators;
mod wait;

pub use configuration::HarnessConfiguration;
pub use data::{PreparedRequest, RequestBody, RequestDescriptor, ResponseEnvelope};
pub use data_generator::{TestDataGenerator, DEFAULT_PICTURE};
pub use driver::{BrowserDriver, Locator};
pub use error::{AssertionFailure, Error};
pub use form_data::{ApiUserPayload, FormUserData, FormUserDataBuilder, Gender, Hobby, Locality};
pub use form_page::{
    expected_rows, row_value, FormSection, FormState, RegistrationForm, RegistrationSelectors,
    CONFIRMATION_TITLE, FORM_PATH, INVALID_BORDER_COLOR,
};
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use interactions::{day_token, CalendarSelectors, FieldInteractions};
pub use request_executor::RequestExecutor;
pub use simulated::SimulatedRegistrationPage;
pub use stub_server::{RecordedRequest, StubResponse, StubRoute, StubServer};
pub use validators::{FieldValidationSpec, ValidationKind};
pub use wait::{WaitBudget, DEFAULT_POLL_INTERVAL};

pub use sitecheck_codegen::scenario_test;

#[doc(hidden)]
pub mod __private {
    pub use tokio;
}
