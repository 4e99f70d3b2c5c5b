use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::Credential,
    error::{GeocodeError, Result},
    model::{GeocodeResult, Query, SearchOptions},
};

use super::Geocoder;

pub const DEFAULT_BASE_URL: &str = "https://api.geoapify.com";
const SEARCH_PATH: &str = "/v1/geocode/search";

/// Client for the Geoapify forward-geocoding endpoint.
///
/// Holds only immutable state; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GeoapifyClient {
    credential: Credential,
    base_url: String,
    timeout: Option<Duration>,
    http: Client,
}

impl GeoapifyClient {
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full request URL. All parameters, the key included, are form-encoded.
    pub fn search_url(&self, query: &Query, options: &SearchOptions) -> Result<Url> {
        let endpoint = format!("{}{SEARCH_PATH}", self.base_url.trim_end_matches('/'));

        let mut params = vec![
            ("text", query.as_str().to_string()),
            ("apiKey", self.credential.expose().to_string()),
        ];
        if let Some(limit) = options.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(lang) = &options.lang {
            params.push(("lang", lang.clone()));
        }

        Url::parse_with_params(&endpoint, &params).map_err(|e| {
            GeocodeError::config(format!("Invalid Geoapify base URL '{}': {e}", self.base_url))
        })
    }

    /// Look up `query` with default options.
    pub async fn geocode(&self, query: &Query) -> Result<GeocodeResult> {
        self.search(query, &SearchOptions::default()).await
    }

    /// Issue exactly one GET and decode the body. Never retries.
    pub async fn search(&self, query: &Query, options: &SearchOptions) -> Result<GeocodeResult> {
        let url = self.search_url(query, options)?;

        // The URL carries the API key, so it stays out of logs and error messages.
        tracing::debug!(%query, ?options, "sending Geoapify geocode request");

        let mut req = self.http.get(url);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let res = req.send().await.map_err(transport)?;

        let status = res.status();
        let body = res.bytes().await.map_err(transport)?;
        tracing::debug!(%status, bytes = body.len(), "received Geoapify response");

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            return Err(GeocodeError::Remote { status, body });
        }

        // Invalid UTF-8 in the body is a decode error.
        let parsed: Value = serde_json::from_slice(&body)?;
        tracing::trace!(response = %parsed, "decoded Geoapify response");

        Ok(GeocodeResult::from(parsed))
    }
}

#[async_trait]
impl Geocoder for GeoapifyClient {
    async fn geocode(&self, query: &Query, options: &SearchOptions) -> Result<GeocodeResult> {
        self.search(query, options).await
    }
}

fn transport(err: reqwest::Error) -> GeocodeError {
    GeocodeError::Transport(err.without_url())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeoapifyClient {
        GeoapifyClient::new(Credential::new("KEY-123").unwrap())
    }

    #[test]
    fn search_url_encodes_query_and_keeps_key_literal() {
        let q = Query::new("New York").unwrap();
        let url = client().search_url(&q, &SearchOptions::default()).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.geoapify.com/v1/geocode/search?text=New+York&apiKey=KEY-123"
        );
    }

    #[test]
    fn search_url_escapes_reserved_characters() {
        let q = Query::new("Rue de l'Église & Co, Paris").unwrap();
        let url = client().search_url(&q, &SearchOptions::default()).unwrap();

        let text = url
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned());
        assert_eq!(text.as_deref(), Some("Rue de l'Église & Co, Paris"));
        assert!(!url.as_str().contains(' '));
        assert!(url.as_str().contains("%26"));
    }

    #[test]
    fn search_url_key_with_reserved_characters_survives_encoding() {
        let c = GeoapifyClient::new(Credential::new("a+b&c=d").unwrap());
        let q = Query::new("Oslo").unwrap();
        let url = c.search_url(&q, &SearchOptions::default()).unwrap();

        let key = url
            .query_pairs()
            .find(|(k, _)| k == "apiKey")
            .map(|(_, v)| v.into_owned());
        assert_eq!(key.as_deref(), Some("a+b&c=d"));
        assert_eq!(url.query_pairs().count(), 2);
    }

    #[test]
    fn search_url_appends_options_only_when_set() {
        let q = Query::new("Berlin").unwrap();
        let options = SearchOptions { limit: Some(3), lang: Some("de".into()) };
        let url = client()
            .with_base_url("http://localhost:9000/")
            .search_url(&q, &options)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v1/geocode/search?text=Berlin&apiKey=KEY-123&limit=3&lang=de"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let q = Query::new("Berlin").unwrap();
        let err = client()
            .with_base_url("not a url")
            .search_url(&q, &SearchOptions::default())
            .unwrap_err();

        assert!(matches!(err, GeocodeError::Config(_)));
    }

    #[test]
    fn builder_sets_timeout() {
        let c = client();
        assert_eq!(c.timeout(), None);
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);

        let c = c.with_timeout(Duration::from_secs(2));
        assert_eq!(c.timeout(), Some(Duration::from_secs(2)));
    }
}
