use crate::{
    configuration::HarnessConfiguration,
    data::{PreparedRequest, RequestDescriptor, ResponseEnvelope},
    error::Error,
    http_client::{HttpClient, ReqwestHttpClient},
    util,
};
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Issues one HTTP call per descriptor and hands back whatever the service answered.
///
/// The executor never retries and never interprets the status code unless the descriptor
/// asks for it, so scenarios see the raw behavior of the service.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    default_headers: HashMap<String, String>,
    default_timeout: Duration,
    http_client: Arc<dyn HttpClient + Send + Sync>,
}

impl RequestExecutor {
    pub fn new(configuration: &HarnessConfiguration) -> Self {
        Self::with_http_client(configuration, Arc::new(http_client(configuration)))
    }

    pub fn with_http_client(
        configuration: &HarnessConfiguration,
        http_client: Arc<dyn HttpClient + Send + Sync>,
    ) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert(
            String::from("content-type"),
            String::from("application/json"),
        );
        default_headers.insert(
            String::from("x-api-key"),
            String::from(configuration.api_key()),
        );

        Self {
            default_headers,
            default_timeout: configuration.response_timeout(),
            http_client,
        }
    }

    pub fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolve the descriptor against the executor defaults without sending anything.
    pub fn prepare(&self, descriptor: RequestDescriptor) -> PreparedRequest {
        let headers = if descriptor.use_default_headers {
            util::merge_headers(&self.default_headers, &descriptor.headers)
        } else {
            util::merge_headers(&HashMap::new(), &descriptor.headers)
        };

        PreparedRequest {
            method: descriptor.method,
            url: descriptor.url,
            headers,
            body: descriptor.body,
            timeout: descriptor.timeout.unwrap_or(self.default_timeout),
        }
    }

    /// Execute the request.
    ///
    /// # Errors
    /// Transport failures and timeouts always surface. A non-2xx status is only an error when
    /// the descriptor set `fail_on_status_code`.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<ResponseEnvelope, Error> {
        let fail_on_status_code = descriptor.fail_on_status_code;
        let request = self.prepare(descriptor);
        let url = request.url.clone();

        debug!(method = %request.method, url = %url, "sending request");
        let envelope = self.http_client.send(request).await?;
        info!(
            url = %url,
            status = envelope.status_code,
            duration_ms = envelope.duration.as_millis() as u64,
            "received response"
        );

        if fail_on_status_code && !envelope.is_success() {
            return Err(Error::UnexpectedStatus {
                url,
                status_code: envelope.status_code,
            });
        }

        Ok(envelope)
    }
}

/// Reqwest client honoring the configured connect timeout. If the client can't be built
/// the default one is used instead and the failure is logged.
fn http_client(configuration: &HarnessConfiguration) -> ReqwestHttpClient {
    match reqwest::Client::builder()
        .connect_timeout(configuration.request_timeout())
        .build()
    {
        Ok(client) => ReqwestHttpClient::with_client(client),
        Err(e) => {
            warn!(
                error = %e,
                connect_timeout_ms = configuration.request_timeout().as_millis() as u64,
                "falling back to a default HTTP client without the connect timeout"
            );
            ReqwestHttpClient::new()
        }
    }
}
