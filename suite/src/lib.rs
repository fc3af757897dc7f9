//! Scenarios for the DemoQA registration form and the ReqRes users API.

#[cfg(feature = "chromium")]
pub mod chromium_driver;
pub mod error;
pub mod reqres;
pub mod reqres_playback;
pub mod student_registration;
pub mod users_api_scenarios;

#[cfg(feature = "chromium")]
pub use chromium_driver::ChromiumDriver;
pub use error::Error;
pub use reqres::UsersApi;
pub use reqres_playback::reqres_routes;
