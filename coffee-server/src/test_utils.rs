use crate::config::Settings;
use crate::create_app;
use crate::state::AppState;
use axum::body::Body;
use axum::Router;
use coffee_auth::config::JWKS_PATH;
use coffee_auth::test_utils::{token_claims, MockIdentityProvider, TestKeys};
use coffee_auth::Authorizer;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const AUDIENCE: &str = "drinks";

/// Test fixture for driving the whole router against a mock identity provider.
///
/// The provider publishes [`TestKeys::primary`], so tokens minted with
/// [`TestFixture::token`] verify while tokens signed by any other key do not.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post("/drinks", &json!({"title": "Latte", "recipe": []}), &["post:drinks"])
///         .await;
///
///     response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// Shared application state, for inspecting the drink store
    pub state: AppState,
    /// Mock identity provider serving the signing keys
    pub provider: MockIdentityProvider,
}

impl TestFixture {
    /// Creates a fixture with an empty drink store.
    pub async fn new() -> Self {
        Self::with_settings(|settings| settings).await
    }

    /// Creates a fixture whose store holds the house drink.
    pub async fn seeded() -> Self {
        Self::with_settings(|settings| Settings {
            seed_drinks: true,
            ..settings
        })
        .await
    }

    /// Creates a fixture after letting `customize` adjust the test settings.
    pub async fn with_settings(customize: impl FnOnce(Settings) -> Settings) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path(format!("/{JWKS_PATH}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestKeys::primary().key_set()))
            .mount(&server)
            .await;
        let provider = MockIdentityProvider { server };

        let settings = customize(Settings::for_test(provider.auth_config(AUDIENCE)));
        let authorizer =
            Authorizer::new(settings.auth.clone()).expect("Failed to create authorizer");
        let state = AppState::with_authorizer(settings.clone(), authorizer).await;
        let app = create_app(state.clone()).await;

        Self {
            app,
            settings,
            state,
            provider,
        }
    }

    /// Initializes the test logger with customized settings.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// A valid token carrying `permissions`.
    pub fn token(&self, permissions: &[&str]) -> String {
        TestKeys::primary().sign(&token_claims(&self.settings.auth, Some(permissions), 3600))
    }

    /// Creates a request builder, authenticated when `token` is given.
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        token: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    /// Sends an unauthenticated GET request.
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        self.send_json(Method::GET, uri, None::<&Value>, None).await
    }

    /// Sends a GET request with a token carrying `permissions`.
    pub async fn get_with(&self, uri: impl AsRef<str>, permissions: &[&str]) -> TestResponse {
        let token = self.token(permissions);
        self.send_json(Method::GET, uri, None::<&Value>, Some(&token))
            .await
    }

    /// Sends a POST request with a JSON body and a token carrying `permissions`.
    pub async fn post<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        permissions: &[&str],
    ) -> TestResponse {
        let token = self.token(permissions);
        self.send_json(Method::POST, uri, Some(body), Some(&token))
            .await
    }

    /// Sends a PATCH request with a JSON body and a token carrying `permissions`.
    pub async fn patch<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        permissions: &[&str],
    ) -> TestResponse {
        let token = self.token(permissions);
        self.send_json(Method::PATCH, uri, Some(body), Some(&token))
            .await
    }

    /// Sends a DELETE request with a token carrying `permissions`.
    pub async fn delete(&self, uri: impl AsRef<str>, permissions: &[&str]) -> TestResponse {
        let token = self.token(permissions);
        self.send_json(Method::DELETE, uri, None::<&Value>, Some(&token))
            .await
    }

    /// Sends a request with an optional JSON body and an optional raw token.
    pub async fn send_json<T: Serialize>(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        body: Option<&T>,
        token: Option<&str>,
    ) -> TestResponse {
        let body = match body {
            Some(body) => {
                Body::from(serde_json::to_vec(body).expect("Failed to serialize body to JSON"))
            }
            None => Body::empty(),
        };
        let request = self
            .request_builder(method, uri, token)
            .body(body)
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse { status, json }
    }

    /// Number of key set requests the identity provider has received.
    pub async fn key_set_fetches(&self) -> usize {
        self.provider
            .server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Asserts an authorization rejection with the given status and error code.
    pub fn assert_auth_error(&self, expected: StatusCode, code: &str) -> &Self {
        self.assert_status(expected);
        assert_eq!(self.json["success"], false);
        assert_eq!(self.json["error"], expected.as_u16());
        assert_eq!(self.json["message"]["code"], code);
        self
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if deserialization fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
