use serde_json::Value;
use sitecheck::{HarnessConfiguration, RequestDescriptor, RequestExecutor, ResponseEnvelope};
use std::fmt::Display;

pub mod endpoints {
    use std::fmt::Display;

    pub const USERS: &str = "/users";

    pub fn user_by_id<T: Display>(id: T) -> String {
        format!("/users/{}", id)
    }
}

pub mod status_codes {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const FORBIDDEN: u16 = 403;
    pub const NOT_FOUND: u16 = 404;
    pub const PAYLOAD_TOO_LARGE: u16 = 413;
}

pub mod response_times {
    use std::time::Duration;

    pub const FAST: Duration = Duration::from_millis(500);
    pub const ACCEPTABLE: Duration = Duration::from_millis(1000);
}

pub mod test_data {
    pub const EXISTING_USER_ID: u64 = 2;
    pub const NON_EXISTENT_USER_ID: u64 = 23;
    pub const INVALID_USER_ID: &str = "abc";
    pub const LARGE_PAGE_NUMBER: u64 = 1000;
    pub const LARGE_DATA_SIZE: usize = 10_000;
}

/// Struct that represents a client of the ReqRes users resource.
#[derive(Debug, Clone)]
pub struct UsersApi {
    executor: RequestExecutor,
    base_url: String,
}

impl UsersApi {
    /// Create a UsersApi for the configured base URL and API key.
    ///
    /// # Arguments
    /// `configuration` - the harness configuration of the running scenario.
    ///
    /// # Returns
    /// A UsersApi.
    pub fn new(configuration: &HarnessConfiguration) -> Self {
        Self::with_executor(
            RequestExecutor::new(configuration),
            configuration.api_base_url(),
        )
    }

    /// Create a UsersApi that sends its requests through the given executor.
    ///
    /// # Arguments
    /// `executor` - a pre-configured request executor.
    /// `base_url` - base URL of the API, without a trailing slash.
    ///
    /// # Returns
    /// A UsersApi.
    pub fn with_executor<T: Into<String>>(executor: RequestExecutor, base_url: T) -> Self {
        Self {
            executor,
            base_url: base_url.into(),
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn users_url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::USERS)
    }

    pub fn user_url<T: Display>(&self, id: T) -> String {
        format!("{}{}", self.base_url, endpoints::user_by_id(id))
    }

    /// Gets a single user.
    ///
    /// # Arguments
    /// `id` - the user id. Anything displayable goes, so malformed ids can be probed too.
    ///
    /// # Returns
    /// The response, whatever its status code.
    pub async fn get_user<T: Display>(&self, id: T) -> Result<ResponseEnvelope, sitecheck::Error> {
        self.executor
            .execute(RequestDescriptor::get(self.user_url(id)))
            .await
    }

    /// Gets one page of the user list. Parameters left as `None` are not sent.
    pub async fn list_users(
        &self,
        page: Option<u64>,
        per_page: Option<u64>,
    ) -> Result<ResponseEnvelope, sitecheck::Error> {
        let query = page
            .map(|page| format!("page={}", page))
            .into_iter()
            .chain(per_page.map(|per_page| format!("per_page={}", per_page)))
            .collect::<Vec<_>>();

        let url = if query.is_empty() {
            self.users_url()
        } else {
            format!("{}?{}", self.users_url(), query.join("&"))
        };

        self.executor.execute(RequestDescriptor::get(url)).await
    }

    pub async fn create_user(&self, user: Value) -> Result<ResponseEnvelope, sitecheck::Error> {
        self.executor
            .execute(RequestDescriptor::post(self.users_url()).with_json(user))
            .await
    }

    /// Send a hand-built request, e.g. with a raw body or without the default headers.
    pub async fn execute(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<ResponseEnvelope, sitecheck::Error> {
        self.executor.execute(descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> UsersApi {
        let mut configuration = HarnessConfiguration::default();
        configuration.set_api_base_url("http://127.0.0.1:8080/api/");
        UsersApi::new(&configuration)
    }

    #[test]
    fn test_urls() {
        let api = api();

        assert_eq!(api.users_url(), "http://127.0.0.1:8080/api/users");
        assert_eq!(api.user_url(2), "http://127.0.0.1:8080/api/users/2");
        assert_eq!(
            api.user_url(test_data::INVALID_USER_ID),
            "http://127.0.0.1:8080/api/users/abc"
        );
    }

    #[test]
    fn test_executor_carries_the_api_key() {
        assert_eq!(
            api().executor().default_headers().get("x-api-key"),
            Some(&String::from("reqres-free-v1"))
        );
    }
}
