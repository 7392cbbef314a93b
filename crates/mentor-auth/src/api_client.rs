//! HTTP client for the portal API with bearer auth and 401 refresh-and-replay.
//!
//! Every request carries `Authorization: Bearer <accessToken>` when the token
//! store holds a pair. A 401 on a protected path triggers one token refresh
//! (`POST /mentor-auth/refresh`) and a single replay of the original request.
//! Refreshes are serialized; a request that lost the race replays with the
//! token the winner stored instead of refreshing again.

use crate::{ApiError, ApiResult};
use portal_config_and_utils::Config;
use portal_storage::{TokenPair, TokenStore};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Auth endpoints that never trigger a refresh on 401.
const PUBLIC_AUTH_PATHS: [&str; 6] = [
    "/mentor-auth/login",
    "/mentor-auth/register",
    "/mentor-auth/forgot-password",
    "/mentor-auth/verify-otp",
    "/mentor-auth/reset-password",
    "/mentor-auth/refresh",
];

const REFRESH_PATH: &str = "/mentor-auth/refresh";

/// Invoked after a failed refresh has cleared the stored tokens.
pub type UnauthenticatedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Cloneable handle to the portal API. Clones share the token store, the
/// refresh lock and the unauthenticated hook.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
    refresh_lock: AsyncMutex<()>,
    on_unauthenticated: parking_lot::Mutex<Option<UnauthenticatedHook>>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: impl Into<String>, tokens: Arc<TokenStore>) -> ApiResult<Self> {
        Self::with_timeout(base_url, tokens, None)
    }

    /// Create a client with an optional per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<TokenStore>,
        timeout: Option<Duration>,
    ) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                tokens,
                refresh_lock: AsyncMutex::new(()),
                on_unauthenticated: parking_lot::Mutex::new(None),
            }),
        })
    }

    /// Create a client from the portal configuration.
    pub fn from_config(config: &Config, tokens: Arc<TokenStore>) -> ApiResult<Self> {
        let base_url = config
            .api_url()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Self::with_timeout(base_url, tokens, config.request_timeout())
    }

    /// Base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Install the hook fired when a refresh fails and the session is gone.
    pub(crate) fn set_unauthenticated_hook(&self, hook: UnauthenticatedHook) {
        *self.inner.on_unauthenticated.lock() = Some(hook);
    }

    // ==========================================
    // Typed helpers
    // ==========================================

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(Method::DELETE, path, None).await
    }

    /// Send a request and decode the JSON response. An empty body decodes
    /// as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let response = self.execute(method, path, body.as_ref()).await?;
        let text = response.text().await?;
        let raw = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };
        Ok(serde_json::from_str(raw)?)
    }

    // ==========================================
    // Refresh and replay
    // ==========================================

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ApiResult<Response> {
        let token = self.inner.tokens.access_token()?;
        let response = self
            .dispatch(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || is_public_auth_path(path) {
            return check_response(response, path).await;
        }

        debug!(path, "Access token rejected, refreshing");
        let fresh = self.renew_after_rejection(token.as_deref()).await?;

        // The replay is marked retried: its 401, if any, goes to the caller.
        let replay = self.dispatch(method, path, body, Some(&fresh)).await?;
        check_response(replay, path).await
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ApiResult<Response> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self.inner.http.request(method, &url);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Obtain an access token to replay with after `stale` was rejected.
    async fn renew_after_rejection(&self, stale: Option<&str>) -> ApiResult<String> {
        let _guard = self.inner.refresh_lock.lock().await;

        let Some(pair) = self.inner.tokens.load()? else {
            warn!("No refresh token available, signing out");
            self.sign_out();
            return Err(ApiError::Unauthenticated);
        };

        if stale != Some(pair.access_token.as_str()) {
            debug!("Access token already rotated, replaying with stored token");
            return Ok(pair.access_token);
        }

        match self.refresh(&pair.refresh_token).await {
            Ok(renewed) => {
                // The server has rotated the refresh token; a pair that
                // failed to persist cannot be recovered.
                if let Err(e) = self.inner.tokens.save(&renewed) {
                    warn!(error = %e, "Failed to persist refreshed tokens, signing out");
                    self.sign_out();
                    return Err(ApiError::Unauthenticated);
                }
                info!("Access token refreshed");
                Ok(renewed.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, signing out");
                self.sign_out();
                Err(ApiError::Unauthenticated)
            }
        }
    }

    /// Exchange a refresh token for a new pair. Bypasses the 401 handling.
    async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        let response = self
            .inner
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let response = check_response(response, REFRESH_PATH).await?;
        Ok(response.json::<TokenPair>().await?)
    }

    fn sign_out(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }

        let hook = self.inner.on_unauthenticated.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }
}

fn is_public_auth_path(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    let normalized = format!("/{}", path.trim_matches('/'));
    PUBLIC_AUTH_PATHS.contains(&normalized.as_str())
}

/// Map a non-success response to an error, passing successes through.
async fn check_response(response: Response, path: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, path, body = %body, "Request failed");

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(path.to_string()));
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_default();

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_storage::{MemoryStorage, SecureStorage, StorageError, StorageKeys, StorageResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_store(pair: Option<TokenPair>) -> Arc<TokenStore> {
        let store = TokenStore::new(Box::new(MemoryStorage::new()));
        if let Some(pair) = pair {
            store.save(&pair).unwrap();
        }
        Arc::new(store)
    }

    fn client(server: &MockServer, tokens: Arc<TokenStore>) -> ApiClient {
        ApiClient::new(format!("{}/api", server.uri()), tokens).unwrap()
    }

    #[test]
    fn test_public_auth_paths() {
        assert!(is_public_auth_path("/mentor-auth/login"));
        assert!(is_public_auth_path("mentor-auth/refresh/"));
        assert!(is_public_auth_path("/mentor-auth/verify-otp?x=1"));
        assert!(!is_public_auth_path("/mentor-auth/profile"));
        assert!(!is_public_auth_path("/course/my-curriculums"));
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("Authorization", "Bearer at-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, token_store(Some(TokenPair::new("at-1", "rt-1"))));
        let body: Value = api.get("/mentor/courses").await.unwrap();
        assert_eq!(body, json!({ "data": [] }));
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_and_replays_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/course/my-curriculums"))
            .and(header("Authorization", "Bearer old-at"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .and(body_json(json!({ "refreshToken": "rt-1" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "new-at", "refreshToken": "rt-2" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/course/my-curriculums"))
            .and(header("Authorization", "Bearer new-at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "_id": "c1" }])))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = token_store(Some(TokenPair::new("old-at", "rt-1")));
        let api = client(&server, tokens.clone());

        let body: Value = api.get("/course/my-curriculums").await.unwrap();
        assert_eq!(body, json!([{ "_id": "c1" }]));
        assert_eq!(tokens.load().unwrap(), Some(TokenPair::new("new-at", "rt-2")));
    }

    #[tokio::test]
    async fn test_replay_rejected_is_not_refreshed_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/gettopics"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "new-at", "refreshToken": "rt-2" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = token_store(Some(TokenPair::new("old-at", "rt-1")));
        let api = client(&server, tokens.clone());

        let err = api.get::<Value>("/mentor/gettopics").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(tokens.has_tokens().unwrap());
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_tokens_and_fires_hook() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor-auth/profile"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid token" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = token_store(Some(TokenPair::new("old-at", "bad-rt")));
        let api = client(&server, tokens.clone());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        api.set_unauthenticated_hook(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let err = api.get::<Value>("/mentor-auth/profile").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(tokens.load().unwrap(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    /// Memory storage that fails every write to one key.
    struct RefusingStorage {
        inner: MemoryStorage,
        refused: &'static str,
    }

    impl SecureStorage for RefusingStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if key == self.refused {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.set(key, value)
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> StorageResult<bool> {
            self.inner.delete(key)
        }
    }

    #[tokio::test]
    async fn test_unsaved_refresh_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "new", "refreshToken": "rt-2" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let inner = MemoryStorage::new();
        inner.set(StorageKeys::ACCESS_TOKEN, "old").unwrap();
        inner.set(StorageKeys::REFRESH_TOKEN, "rt-1").unwrap();
        let tokens = Arc::new(TokenStore::new(Box::new(RefusingStorage {
            inner,
            refused: StorageKeys::REFRESH_TOKEN,
        })));

        let api = client(&server, tokens.clone());
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        api.set_unauthenticated_hook(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let err = api.get::<Value>("/mentor/courses").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(tokens.load().unwrap(), None);
        assert_eq!(tokens.access_token().unwrap(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_refresh_token_signs_out_without_refresh_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/class/mentorupcoming"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server, token_store(None));
        let err = api.get::<Value>("/class/mentorupcoming").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_public_endpoint_401_is_returned_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "message": "Invalid credentials" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server, token_store(Some(TokenPair::new("at", "rt"))));
        let err = api
            .post::<_, Value>("/mentor-auth/login", &json!({ "email": "a", "password": "b" }))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_not_found_is_never_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/course/my-curriculums"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, token_store(Some(TokenPair::new("at", "rt"))));
        let err = api.get::<Value>("/course/my-curriculums").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_401s_refresh_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("Authorization", "Bearer old-at"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/mentor/courses"))
            .and(header("Authorization", "Bearer new-at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/mentor-auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "accessToken": "new-at", "refreshToken": "rt-2" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, token_store(Some(TokenPair::new("old-at", "rt-1"))));
        let (a, b) = tokio::join!(
            api.get::<Value>("/mentor/courses"),
            api.get::<Value>("/mentor/courses")
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_unit() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/class/cls-1/cancel"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, token_store(Some(TokenPair::new("at", "rt"))));
        api.delete::<()>("/class/cls-1/cancel").await.unwrap();
    }
}
