//! Datadog monitor API client.
//!
//! [`DatadogClient`] implements [`MonitorRepository`] over the v1 monitor
//! endpoints. Every method is a single request; nothing is retried.

use ddmon_core::{ApiConfig, Monitor, MonitorError, MonitorId, MonitorRepository, TagQuery};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Header carrying the API key (`DD-API-KEY`).
pub const API_KEY_HEADER: &str = "dd-api-key";
/// Header carrying the application key (`DD-APPLICATION-KEY`).
pub const APP_KEY_HEADER: &str = "dd-application-key";

const USER_AGENT: &str = concat!("ddmon/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the monitor collection.
#[derive(Debug, Clone)]
pub struct DatadogClient {
    http: Client,
    base_url: String,
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, MonitorError> {
    HeaderValue::from_str(value)
        .map_err(|_| MonitorError::config(format!("{name} contains invalid characters")))
}

impl DatadogClient {
    /// Creates a client with the credentials installed as default headers.
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::Config` if a key is not a valid header value
    /// and `MonitorError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, MonitorError> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, header_value("API key", config.api_key())?);
        headers.insert(APP_KEY_HEADER, header_value("application key", config.app_key())?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MonitorError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
        })
    }

    /// Returns the API root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, MonitorError> {
        let response = request
            .send()
            .await
            .map_err(|e| MonitorError::Transport(e.to_string()))?;
        let status = response.status();
        debug!(operation, status = status.as_u16(), "datadog response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MonitorError::Remote {
                operation,
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, MonitorError> {
        let response = self.send(operation, request).await?;
        let body = response
            .text()
            .await
            .map_err(|e| MonitorError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Query parameters for the list endpoint.
fn list_params(tags: &TagQuery, search: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(tags) = tags.to_param() {
        params.push(("monitor_tags", tags));
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        params.push(("query", search.to_string()));
    }
    params
}

impl MonitorRepository for DatadogClient {
    async fn list(&self, tags: &TagQuery, search: Option<&str>) -> Result<Vec<Monitor>, MonitorError> {
        let params = list_params(tags, search);
        debug!(params = ?params, "listing monitors");
        let request = self.request(Method::GET, "/monitor").query(&params);
        self.send_json("list monitors", request).await
    }

    async fn get(&self, id: MonitorId) -> Result<Monitor, MonitorError> {
        let request = self.request(Method::GET, &format!("/monitor/{id}"));
        self.send_json("get monitor", request).await
    }

    async fn create(&self, monitor: &Monitor) -> Result<Monitor, MonitorError> {
        let request = self.request(Method::POST, "/monitor").json(monitor);
        self.send_json("create monitor", request).await
    }

    async fn update(&self, id: MonitorId, monitor: &Monitor) -> Result<Monitor, MonitorError> {
        let request = self
            .request(Method::PUT, &format!("/monitor/{id}"))
            .json(monitor);
        self.send_json("update monitor", request).await
    }

    async fn delete(&self, id: MonitorId) -> Result<(), MonitorError> {
        let request = self.request(Method::DELETE, &format!("/monitor/{id}"));
        self.send("delete monitor", request).await?;
        Ok(())
    }
}
