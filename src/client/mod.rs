pub mod devices;
pub mod measurements;
pub mod readings;
pub mod reports;
pub mod sensors;

use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{self, ClientError};
use crate::models::{ApiEnvelope, Health, WeatherUsage};

/// Query pairs for one call. Resource methods only push defined values, so
/// an unset option never reaches the URL; `0`, `false` and `""` do.
pub(crate) type Query = Vec<(&'static str, String)>;

/// Typed access layer over the EMS backend.
///
/// Holds no mutable state: clones share one connection pool, and calls are
/// independent and may race freely. Every failure surfaces as one
/// [`ClientError`]; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct EmsClient {
    http: Client,
    base_url: String,
    envelope: bool,
}

impl EmsClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ClientError::transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            envelope: config.envelope,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/api/health`
    pub async fn health(&self) -> Result<Health, ClientError> {
        self.get("/api/health", Query::new()).await
    }

    /// GET `/api/ext/weather-usage`
    ///
    /// Combined external-weather and trailing-24h-usage snapshot shown on
    /// the dashboard.
    pub async fn weather_usage(&self) -> Result<WeatherUsage, ClientError> {
        self.get("/api/ext/weather-usage", Query::new()).await
    }

    // -----------------------------------------------------------------------
    // Request plumbing. Every resource call funnels through here.
    // -----------------------------------------------------------------------

    pub(crate) fn url(&self, path: &str, query: &Query) -> Result<Url, ClientError> {
        let full = format!("{}{}", self.base_url, path);
        if query.is_empty() {
            Url::parse(&full)
        } else {
            Url::parse_with_params(&full, query)
        }
        .map_err(ClientError::transport)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query,
    ) -> Result<T, ClientError> {
        self.request(Method::GET, path, query, None::<&()>).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.request(Method::POST, path, Query::new(), Some(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.request(Method::PUT, path, Query::new(), Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, Query::new(), None::<&()>)
            .await
    }

    pub(crate) async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path, &query)?;
        debug!(%method, %url, "ems request");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ClientError::transport)?;
        self.read_response(response).await
    }

    /// Send a multipart body through the shared response handling. The JSON
    /// content-type never applies here; reqwest sets the multipart boundary
    /// header itself.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let url = self.url(path, &Query::new())?;
        debug!(%url, "ems multipart request");

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::transport)?;
        self.read_response(response).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error::http_error(status.as_u16(), &body));
        }

        // 204 and genuinely empty bodies both decode from `null`, so void
        // operations resolve to `()` instead of a parse error.
        let value = if status == StatusCode::NO_CONTENT {
            Value::Null
        } else {
            let bytes = response.bytes().await.map_err(ClientError::transport)?;
            if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).map_err(ClientError::transport)?
            }
        };

        if value.is_null() {
            return serde_json::from_value(Value::Null).map_err(ClientError::transport);
        }

        if self.envelope {
            let envelope: ApiEnvelope<Value> =
                serde_json::from_value(value).map_err(ClientError::transport)?;
            let data = envelope.into_result()?.unwrap_or(Value::Null);
            serde_json::from_value(data).map_err(ClientError::transport)
        } else {
            serde_json::from_value(value).map_err(ClientError::transport)
        }
    }
}
