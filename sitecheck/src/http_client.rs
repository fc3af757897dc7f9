use crate::{
    data::{PreparedRequest, RequestBody, ResponseEnvelope},
    error::Error,
    util,
};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::{fmt::Debug, time::Instant};

#[async_trait]
pub trait HttpClient: Debug {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseEnvelope, Error>;
}

#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: PreparedRequest) -> Result<ResponseEnvelope, Error> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = request;

        let mut header_map = HeaderMap::new();
        util::put_headers(&mut header_map, &headers)?;

        let mut request_builder = self
            .client
            .request(method, url.as_str())
            .headers(header_map)
            .timeout(timeout);

        request_builder = match body {
            Some(RequestBody::Json(value)) => request_builder.body(serde_json::to_vec(&value)?),
            Some(RequestBody::Raw(text)) => request_builder.body(text),
            None => request_builder,
        };

        let started = Instant::now();
        let response = request_builder
            .send()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;
        let duration = started.elapsed();

        Ok(ResponseEnvelope {
            status_code,
            headers,
            body: ResponseEnvelope::parse_body(&body),
            duration,
        })
    }
}

fn transport_error(e: reqwest::Error, url: &str, budget: std::time::Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            waited_for: format!("a response from {}", url),
            budget,
        }
    } else {
        Error::ReqwestError(e)
    }
}
