//! HTTP client for the LMS backend list endpoints

use async_trait::async_trait;
use lms_core::{ApiConfig, EndpointsConfig, Error, Result};
use lms_protocol::envelope::extract_list;
use lms_types::SourceKind;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

/// Optional query parameters for list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum number of records to return
    pub limit: Option<usize>,

    /// Restrict to one user's records
    pub user_id: Option<String>,
}

impl ListQuery {
    /// Query with only a limit
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            user_id: None,
        }
    }

    /// Add a user restriction
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    fn to_query_string(&self) -> String {
        let mut query_params = Vec::new();

        if let Some(limit) = self.limit {
            query_params.push(format!("limit={limit}"));
        }
        if let Some(ref user_id) = self.user_id {
            query_params.push(format!("user_id={}", urlencoding::encode(user_id)));
        }

        query_params.join("&")
    }
}

/// Source of raw activity lists
///
/// Implemented by [`ApiClient`]; pages and the poller only depend on this
/// trait so they can be driven without a live backend.
#[async_trait]
pub trait ActivityFetcher: Send + Sync {
    /// Fetch the list for `source`, already unwrapped to a JSON array
    async fn fetch(&self, source: SourceKind, query: &ListQuery) -> Result<Value>;
}

/// API client for the LMS backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    endpoints: EndpointsConfig,
}

impl ApiClient {
    /// Create a new API client with default endpoints
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            endpoints: EndpointsConfig::default(),
        }
    }

    /// Build a client from configuration, applying the request timeout
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {e}")))?;

        let mut api = Self::new(config.base_url.clone()).with_endpoints(config.endpoints.clone());
        api.client = client;
        if let Some(ref api_key) = config.api_key {
            api = api.with_api_key(api_key.clone());
        }
        Ok(api)
    }

    /// Set the API key sent as `X-API-Key`
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override endpoint paths
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint path serving `source`
    #[must_use]
    pub fn endpoint(&self, source: SourceKind) -> &str {
        match source {
            SourceKind::Log => &self.endpoints.logs,
            SourceKind::Enrollment => &self.endpoints.enrollments,
            SourceKind::Completion => &self.endpoints.completions,
        }
    }

    /// Full request URL for `source` with `query`
    #[must_use]
    pub fn url_for(&self, source: SourceKind, query: &ListQuery) -> String {
        let path = self.endpoint(source);
        let mut url = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };

        let query_string = query.to_query_string();
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        url
    }

    /// GET the list for `source` and return the raw body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success status and [`Error::Serialization`] if the body is not JSON.
    #[instrument(skip(self, query))]
    pub async fn get_list(&self, source: SourceKind, query: &ListQuery) -> Result<Value> {
        let url = self.url_for(source, query);
        let mut request = self.client.get(&url);

        if let Some(ref api_key) = self.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("Failed to fetch {source} records: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = status.canonical_reason().unwrap_or("unexpected status").to_string();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read {source} response: {e}")))?;

        debug!(url = %url, bytes = body.len(), "Fetched activity list");

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ActivityFetcher for ApiClient {
    async fn fetch(&self, source: SourceKind, query: &ListQuery) -> Result<Value> {
        let body = self.get_list(source, query).await?;
        Ok(extract_list(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_for_default_endpoints() {
        let client = ApiClient::new("https://lms.example.com/");

        assert_eq!(client.base_url(), "https://lms.example.com");
        assert_eq!(
            client.url_for(SourceKind::Log, &ListQuery::default()),
            "https://lms.example.com/api/activity-logs"
        );
        assert_eq!(
            client.url_for(SourceKind::Completion, &ListQuery::with_limit(10)),
            "https://lms.example.com/api/completions?limit=10"
        );
    }

    #[test]
    fn test_user_id_is_encoded() {
        let client = ApiClient::new("http://localhost:8000");
        let query = ListQuery::with_limit(5).for_user("ani putri&co");

        assert_eq!(
            client.url_for(SourceKind::Enrollment, &query),
            "http://localhost:8000/api/enrollments?limit=5&user_id=ani%20putri%26co"
        );
    }

    #[test]
    fn test_custom_endpoints() {
        let endpoints = EndpointsConfig {
            logs: "admin/audit".to_string(),
            ..EndpointsConfig::default()
        };
        let client = ApiClient::new("http://localhost").with_endpoints(endpoints);

        assert_eq!(client.endpoint(SourceKind::Log), "admin/audit");
        assert_eq!(
            client.url_for(SourceKind::Log, &ListQuery::default()),
            "http://localhost/admin/audit"
        );
    }
}
