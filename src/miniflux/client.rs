use super::types::{EntriesResponse, UpdateEntriesRequest};
use crate::credentials::Credentials;
use crate::store::{Entry, EntryId};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Upper bound for an entries response. Unread batches carry full HTML
/// content, so this is generous.
const MAX_RESPONSE_SIZE: usize = 64 * 1024 * 1024; // 64MB

const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Authentication rejected (status {0}): check your API key")]
    Unauthorized(u16),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to encode request body: {0}")]
    Encode(serde_json::Error),
    #[error("Invalid instance URL")]
    InvalidUrl,
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(err)
        }
    }
}

/// Thin client for the Miniflux v1 API.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct MinifluxClient {
    http: reqwest::Client,
    base: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for MinifluxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinifluxClient")
            .field("base", &self.base.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl MinifluxClient {
    /// Build a client for the instance in `credentials`.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Instance URL (may include a sub-path) and API key
    /// * `timeout` - Per-request timeout, covering connect and body
    ///
    /// # Errors
    ///
    /// `ClientError::InvalidUrl` if the instance URL does not parse, or
    /// `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(&credentials.instance_url).map_err(|_| ClientError::InvalidUrl)?;
        // Keep any sub-path so that relative joins land under it
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .redirect(Policy::limited(3))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base,
            api_key: credentials.api_key.clone(),
        })
    }

    /// Instance root that API paths are resolved against, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|_| ClientError::InvalidUrl)
    }

    /// Fetch the unread batch in publish order, oldest first.
    ///
    /// `limit == 0` fetches every unread entry.
    pub async fn fetch_unread(&self, limit: u32) -> Result<Vec<Entry>, ClientError> {
        let mut url = self.endpoint("v1/entries")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("status", "unread")
                .append_pair("order", "published_at")
                .append_pair("direction", "asc");
            if limit > 0 {
                query.append_pair("limit", &limit.to_string());
            }
        }

        tracing::debug!(url = %url, "Fetching unread entries");
        let response = self
            .http
            .get(url)
            .header(AUTH_HEADER, self.api_key.expose_secret())
            .send()
            .await?;
        let body = read_limited_text(check_status(response)?, MAX_RESPONSE_SIZE).await?;

        let parsed: EntriesResponse = serde_json::from_str(&body)?;
        tracing::info!(
            total = parsed.total,
            received = parsed.entries.len(),
            "Fetched unread entries"
        );
        Ok(parsed.entries.into_iter().map(Entry::from).collect())
    }

    /// Set the given entries' status to read on the server.
    pub async fn mark_read(&self, ids: &[EntryId]) -> Result<(), ClientError> {
        if ids.is_empty() {
            return Ok(());
        }
        let url = self.endpoint("v1/entries")?;
        let body = serde_json::to_vec(&UpdateEntriesRequest {
            entry_ids: ids.iter().map(|id| id.0).collect(),
            status: "read",
        })
        .map_err(ClientError::Encode)?;

        let response = self
            .http
            .put(url)
            .header(AUTH_HEADER, self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(response)?;

        tracing::debug!(count = ids.len(), "Entries marked read on server");
        Ok(())
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        code @ (401 | 403) => Err(ClientError::Unauthorized(code)),
        code => Err(ClientError::HttpStatus(code)),
    }
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, ClientError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ClientError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ClientError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| ClientError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> MinifluxClient {
        let creds = Credentials::new(uri, "secret-token");
        MinifluxClient::new(&creds, Duration::from_secs(5)).unwrap()
    }

    fn entries_body() -> serde_json::Value {
        serde_json::json!({
            "total": 2,
            "entries": [
                { "id": 2, "title": "Older", "url": "https://a.example/2", "content": "<p>a</p>",
                  "published_at": "2024-01-01T00:00:00Z", "status": "unread",
                  "feed": { "id": 1, "title": "Feed A" } },
                { "id": 1, "title": "Newer", "url": "https://a.example/1", "content": "<p>b</p>",
                  "published_at": "2024-01-02T00:00:00Z", "status": "unread",
                  "feed": { "id": 1, "title": "Feed A" } }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_unread_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/entries"))
            .and(query_param("status", "unread"))
            .and(query_param("order", "published_at"))
            .and(header("X-Auth-Token", "secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries_body()))
            .mount(&server)
            .await;

        let entries = client_for(&server.uri()).fetch_unread(0).await.unwrap();
        let ids: Vec<i64> = entries.iter().map(|e| e.id.0).collect();
        // Service order is kept as-is
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(entries[0].feed_title, "Feed A");
    }

    #[tokio::test]
    async fn test_fetch_unread_sends_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/entries"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries_body()))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server.uri()).fetch_unread(25).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_instance_sub_path_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/miniflux/v1/entries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries_body()))
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/miniflux", server.uri()));
        assert!(client.fetch_unread(0).await.is_ok());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).fetch_unread(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(401)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).fetch_unread(0).await.unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus(502)));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server.uri()).fetch_unread(0).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_mark_read_sends_ids() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/entries"))
            .and(header("X-Auth-Token", "secret-token"))
            .and(body_json(serde_json::json!({ "entry_ids": [5, 9], "status": "read" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server.uri())
            .mark_read(&[EntryId(5), EntryId(9)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_empty_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        client_for(&server.uri()).mark_read(&[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_mark_read_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server.uri())
            .mark_read(&[EntryId(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_debug_redacts_key() {
        let client = client_for("https://rss.example.com");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_invalid_instance_url() {
        let creds = Credentials::new("not a url", "k");
        assert!(matches!(
            MinifluxClient::new(&creds, Duration::from_secs(1)),
            Err(ClientError::InvalidUrl)
        ));
    }

    #[tokio::test]
    async fn test_base_url_ends_with_slash() {
        let client = client_for("https://rss.example.com/miniflux");
        assert_eq!(client.base_url().as_str(), "https://rss.example.com/miniflux/");
    }

    #[test]
    fn test_encode_error_is_not_reported_as_response_problem() {
        let json_err = serde_json::from_str::<i64>("x").unwrap_err();
        let msg = ClientError::Encode(json_err).to_string();
        assert!(msg.starts_with("Failed to encode request body"));
        assert!(!msg.contains("response"));
    }
}
