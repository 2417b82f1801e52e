//! # API Client
//!
//! HTTP client for communicating with the netbill backend.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::types::ApiResponse;
use crate::auth::SessionStore;
use crate::config::Config;
use crate::notification::NotificationStore;

/// HTTP client for the netbill API.
///
/// Every call is made relative to a fixed base path (`{server}/api`). The
/// session token, when present, is attached as a bearer token. Failed
/// calls are logged, pushed to the [`NotificationStore`] as error
/// notifications and then returned to the caller unchanged, so call sites
/// can still react to them (for example by logging out on 401).
///
/// There is no retry: each call is a single attempt.
///
/// The client is cheaply cloneable and can be shared across accessors.
///
/// # Examples
///
/// ```rust,ignore
/// let client = ApiClient::new(&config, session, notifications)?;
///
/// let response = client.get("/tariffs").await?;
/// println!("{}", response.body);
/// ```
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: SessionStore,
    notifications: NotificationStore,
}

impl ApiClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] if the underlying HTTP client cannot
    /// be built.
    pub fn new(
        config: &Config,
        session: SessionStore,
        notifications: NotificationStore,
    ) -> ApiResult<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("netbill/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http = builder.build().map_err(|e| ApiError::Client {
            message: format!("failed to create HTTP client: {e}"),
            details: String::new(),
        })?;

        Ok(Self {
            base_url: config.api_base(),
            http,
            session,
            notifications,
        })
    }

    /// Returns the configured base URL, including the API prefix.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues a `GET` request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request::<()>(Method::GET, path, None).await
    }

    /// Issues a `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<B>(&self, path: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issues a `PUT` request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put<B>(&self, path: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Issues a `DELETE` request.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request::<()>(Method::DELETE, path, None).await
    }

    /// Issues a request against `{base_url}{path}`.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - Path relative to the API base, starting with `/`
    /// * `body` - Optional JSON body
    ///
    /// # Errors
    ///
    /// * [`ApiError::Server`] - The backend answered with a non-2xx status
    /// * [`ApiError::Network`] - No response was received
    /// * [`ApiError::Client`] - The request could not be constructed
    ///
    /// Every error is also reported to the notification store.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let result = self.send(method, path, body).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let raw_url = format!("{}{}", self.base_url, path);
        let mut trace = RequestTrace {
            method: &method,
            url: &raw_url,
            payload: None,
        };

        let payload = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Client {
                message: format!("failed to serialize request body: {e}"),
                details: trace.render(None, None),
            })?;
        trace.payload = payload.as_deref();

        let url = Url::parse(&raw_url).map_err(|e| ApiError::Client {
            message: format!("invalid request URL: {e}"),
            details: trace.render(None, None),
        })?;

        let mut builder = self.http.request(method.clone(), url);
        if let Some(token) = self.session.token() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(payload) = &payload {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(payload.clone());
        }

        let request = builder.build().map_err(|e| ApiError::Client {
            message: format!("failed to build request: {e}"),
            details: trace.render(None, None),
        })?;

        tracing::debug!(method = %method, url = %raw_url, "Sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Network {
                message: network_message(&e),
                details: trace.render(None, None),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Network {
            message: format!("failed to read response body: {e}"),
            details: trace.render(Some(status), None),
        })?;

        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: server_message(status, &text),
                details: trace.render(Some(status), Some(&text)),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::debug!(url = %raw_url, error = %e, "Response body is not JSON");
                Value::Null
            })
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Log a failure and push it as an error notification.
    pub(crate) fn report(&self, err: &ApiError) {
        tracing::error!(
            title = err.title(),
            status = ?err.status(),
            error = %err,
            "API request failed"
        );
        self.notifications
            .show_error(err.title(), err.message(), Some(err.details().to_string()));
    }
}

/// Method, URL and payload of a request, rendered into error details.
struct RequestTrace<'a> {
    method: &'a Method,
    url: &'a str,
    payload: Option<&'a str>,
}

impl RequestTrace<'_> {
    fn render(&self, status: Option<StatusCode>, response: Option<&str>) -> String {
        let mut lines = vec![
            format!("Method: {}", self.method),
            format!("URL: {}", self.url),
        ];
        if let Some(status) = status {
            lines.push(format!("Status: {status}"));
        }
        if let Some(payload) = self.payload {
            lines.push(format!("Request payload: {payload}"));
        }
        if let Some(response) = response.filter(|r| !r.trim().is_empty()) {
            lines.push(format!("Response body: {}", response.trim()));
        }
        lines.join("\n")
    }
}

fn network_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "The server did not respond in time".to_string()
    } else if err.is_connect() {
        "Could not connect to the server".to_string()
    } else {
        format!("No response from the server: {err}")
    }
}

/// Extracts a message from an error body.
///
/// Prefers a JSON `error` or `message` field, then a plain-text body,
/// then the canonical status text.
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        let field = ["error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .filter(|m| !m.is_empty());
        if let Some(message) = field {
            return message.to_string();
        }
    } else {
        let text = body.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::notification::NotificationKind;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server_url: &str, token: Option<&str>) -> (ApiClient, NotificationStore) {
        let config = Config {
            server_url: server_url.to_string(),
            ..Config::default()
        };
        let session = SessionStore::new(Arc::new(MemoryTokenStore::new(
            token.map(str::to_string),
        )));
        let notifications = NotificationStore::new();
        let client = ApiClient::new(&config, session, notifications.clone()).unwrap();
        (client, notifications)
    }

    #[tokio::test]
    async fn test_attaches_bearer_token_when_present() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(header_eq("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (client, _) = client_for(&mock_server.uri(), Some("abc123"));
        let response = client.get("/users").await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_sends_unauthenticated_without_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tariffs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let (client, _) = client_for(&mock_server.uri(), None);
        client.get("/tariffs").await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/clients"))
            .and(body_json(serde_json::json!({"name": "ACME"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 1})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (client, _) = client_for(&mock_server.uri(), None);
        let response = client
            .post("/clients", &serde_json::json!({"name": "ACME"}))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["id"], 1);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/equipment/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let (client, notifications) = client_for(&mock_server.uri(), None);
        let response = client.delete("/equipment/7").await.unwrap();

        assert_eq!(response.body, Value::Null);
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_classified_and_notified() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/contracts/3"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "database unavailable"})),
            )
            .mount(&mock_server)
            .await;

        let (client, notifications) = client_for(&mock_server.uri(), None);
        let err = client
            .put("/contracts/3", &serde_json::json!({"number": "C-1"}))
            .await
            .unwrap_err();

        match &err {
            ApiError::Server {
                status,
                message,
                details,
            } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "database unavailable");
                assert!(details.contains("Method: PUT"));
                assert!(details.contains("/api/contracts/3"));
                assert!(details.contains(r#"Request payload: {"number":"C-1"}"#));
                assert!(details.contains("database unavailable"));
            }
            other => panic!("expected server error, got {other:?}"),
        }

        let queue = notifications.snapshot();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].kind, NotificationKind::Error);
        assert_eq!(queue[0].title, "Server error");
        assert_eq!(queue[0].message, "database unavailable");
        assert_eq!(queue[0].duration, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_plain_text_error_body_becomes_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/connections"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid token\n"))
            .mount(&mock_server)
            .await;

        let (client, _) = client_for(&mock_server.uri(), Some("stale"));
        let err = client.get("/connections").await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.message(), "Invalid token");
        assert_eq!(err.title(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_empty_error_body_falls_back_to_status_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let (client, _) = client_for(&mock_server.uri(), None);
        let err = client.get("/users").await.unwrap_err();

        assert_eq!(err.message(), "Not Found");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on a port released right after binding it.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (client, notifications) = client_for(&format!("http://{addr}"), None);
        let err = client.get("/users").await.unwrap_err();

        assert!(matches!(err, ApiError::Network { .. }));
        assert_eq!(err.title(), "Network error");
        assert_eq!(notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_url_is_client_error() {
        let (client, notifications) = client_for("http://bad host", None);
        let err = client.get("/users").await.unwrap_err();

        assert!(matches!(err, ApiError::Client { .. }));
        assert!(err.details().contains("URL: http://bad host/api/users"));
        assert_eq!(notifications.snapshot()[0].title, "Request error");
    }
}
