//! HTTP client backed by `reqwest::blocking`

use std::time::Duration;

use reqwest::blocking::Client;

use crate::core::ports::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse};

/// Blocking HTTP client
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Build a client with a default request timeout
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storefront-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

fn classify(err: &reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else if err.is_builder() {
        HttpError::Client(err.to_string())
    } else {
        HttpError::Transport(err.to_string())
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        log::debug!("{} {}", request.method, request.url);
        let response = builder.send().map_err(|e| classify(&e))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| classify(&e))?;
        Ok(HttpResponse { status, body })
    }
}
