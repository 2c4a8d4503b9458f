//! Shared plumbing for the service clients
//!
//! A `ServiceClient` knows one service's base URL and credentials. It turns
//! path segments into endpoint URLs, sends one authenticated request, and
//! hands back the checked envelope.

use crate::auth::Credentials;
use crate::config::ServiceConfig;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Connection details for one service plus the HTTP client to reach it
#[derive(Debug, Clone)]
pub struct ServiceClient {
    name: &'static str,
    base_url: Url,
    credentials: Credentials,
    http: HttpClient,
}

impl ServiceClient {
    /// Create a client for the named service
    pub fn new(name: &'static str, config: &ServiceConfig, http: HttpClient) -> Result<Self> {
        let base_url = config.parse_url()?;
        Ok(Self {
            name,
            base_url,
            credentials: config.credentials(),
            http,
        })
    }

    /// Service name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Base URL of the service
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL parser would drop
    /// or resolve them and the request would reach a different resource.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        for segment in segments {
            check_segment(segment)?;
        }
        url.path_segments_mut()
            .map_err(|()| Error::config(format!("{} is not a valid base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one authenticated request and return the `"ok"` envelope
    pub async fn exchange(
        &self,
        method: Method,
        segments: &[&str],
        request: RequestConfig,
    ) -> Result<Envelope> {
        let url = self.endpoint(segments)?;

        debug!("Invoking {} service at: {} {}", self.name, method, url);

        let response = self
            .http
            .request(
                method,
                url.as_str(),
                request.basic_auth(self.credentials.clone()),
            )
            .await?;

        Envelope::from_response(&response)?.ensure_ok(self.name)
    }

    /// Exchange and discard the details
    pub async fn call(
        &self,
        method: Method,
        segments: &[&str],
        request: RequestConfig,
    ) -> Result<()> {
        self.exchange(method, segments, request).await.map(|_| ())
    }

    /// Exchange and decode the required details
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        request: RequestConfig,
    ) -> Result<T> {
        self.exchange(method, segments, request).await?.details()
    }

    /// Exchange and decode details that may be absent
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        request: RequestConfig,
    ) -> Result<Option<T>> {
        self.exchange(method, segments, request)
            .await?
            .optional_details()
    }
}

fn check_segment(segment: &str) -> Result<()> {
    match segment {
        "" => Err(Error::validation("path segment must not be empty")),
        "." | ".." => Err(Error::validation(format!(
            "'{segment}' is not a valid path segment"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use test_case::test_case;
    use wiremock::matchers::{basic_auth, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(url: &str) -> ServiceClient {
        let config = ServiceConfig::new(url, "id", "secret");
        ServiceClient::new("token", &config, HttpClient::new().unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let svc = service("https://token.internal/api/");
        let url = svc.endpoint(&["connections", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://token.internal/api/connections/abc");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let svc = service("https://token.internal/api");
        let url = svc.endpoint(&["osp", "xero"]).unwrap();
        assert_eq!(url.as_str(), "https://token.internal/api/osp/xero");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let svc = service("https://indexer.internal/indexes");
        let url = svc.endpoint(&["conn 1", "a/b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://indexer.internal/indexes/conn%201/a%2Fb"
        );
    }

    #[test]
    fn test_endpoint_empty_is_base() {
        let svc = service("https://indexer.internal/indexes");
        assert_eq!(
            svc.endpoint(&[]).unwrap().as_str(),
            "https://indexer.internal/indexes"
        );
    }

    #[test_case(&["connections", ".."] ; "parent")]
    #[test_case(&["connections", "."] ; "current")]
    #[test_case(&["connections", ""] ; "empty")]
    #[test_case(&["..", ".."] ; "all dots")]
    fn test_endpoint_rejects_relative_segments(segments: &[&str]) {
        let svc = service("https://token.internal/api");
        let err = svc.endpoint(segments).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{err:?}");
        assert!(err.is_local());
    }

    #[test]
    fn test_endpoint_keeps_dots_inside_segments() {
        let svc = service("https://token.internal/api");
        let url = svc.endpoint(&["connections", "a..b", ".hidden"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://token.internal/api/connections/a..b/.hidden"
        );
    }

    #[tokio::test]
    async fn test_relative_segment_sends_nothing() {
        let mock_server = MockServer::start().await;

        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let svc = service(&mock_server.uri());
        let err = svc
            .call(Method::DELETE, &["connections", ".."], RequestConfig::new())
            .await
            .unwrap_err();
        assert!(err.is_local());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ServiceConfig::new("not a url", "id", "secret");
        let result = ServiceClient::new("token", &config, HttpClient::new().unwrap());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_decodes_details() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/things/1"))
            .and(basic_auth("id", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "message": "",
                "details": {"name": "one"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let svc = service(&mock_server.uri());
        let details: Value = svc
            .fetch(Method::GET, &["things", "1"], RequestConfig::new())
            .await
            .unwrap();
        assert_eq!(details, json!({"name": "one"}));
    }

    #[tokio::test]
    async fn test_exchange_surfaces_service_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/things/2"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": "error",
                "message": "thing 2 does not exist"
            })))
            .mount(&mock_server)
            .await;

        let svc = service(&mock_server.uri());
        let err = svc
            .call(Method::GET, &["things", "2"], RequestConfig::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("thing 2 does not exist"));
    }
}
