use crate::domain::model::HttpOutcome;
use crate::utils::error::{AcceleratorError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::Serialize;

/// Single funnel for outbound HTTP calls.
///
/// Every response the server sends back, 2xx through 5xx, comes back as an
/// [`HttpOutcome`]. Only a call that gets no response at all (refused,
/// DNS, timeout) fails, with [`AcceleratorError::NetworkUnreachable`].
///
/// The header map belongs to this instance and is sent with every call.
pub struct BaseClient {
    base_url: String,
    headers: HeaderMap,
    client: Client,
}

impl BaseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            headers: HeaderMap::new(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets a header for all later calls, replacing any earlier value for `key`.
    pub fn add_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            AcceleratorError::InvalidHeader {
                name: key.to_string(),
                reason: e.to_string(),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| AcceleratorError::InvalidHeader {
            name: key.to_string(),
            reason: e.to_string(),
        })?;

        self.headers.insert(name, value);
        Ok(())
    }

    /// Base URL joined with `path`; the path is otherwise used verbatim.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpOutcome> {
        let url = self.url_for(path);
        tracing::debug!("Sending {} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.headers.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }

        let network_failure = |source: reqwest::Error| {
            tracing::warn!("No response from {} {}: {}", method, url, source);
            AcceleratorError::NetworkUnreachable {
                method: method.clone(),
                url: url.clone(),
                source,
            }
        };

        let response = request.send().await.map_err(network_failure)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(network_failure)?;

        tracing::debug!("{} {} -> {}", method, url, status);
        Ok(HttpOutcome {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<HttpOutcome> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpOutcome> {
        self.request(Method::POST, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpOutcome> {
        self.request(Method::PUT, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpOutcome> {
        self.request(Method::PATCH, path, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<HttpOutcome> {
        self.request(Method::DELETE, path, None).await
    }

    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<HttpOutcome> {
        self.request(Method::DELETE, path, Some(serde_json::to_value(body)?))
            .await
    }
}
