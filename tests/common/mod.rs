#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use qrverify_api::config::{AppConfig, StoreBackend};
use qrverify_api::store::{MemoryStore, Store};
use qrverify_api::{app, AppState};

pub const PASSWORD: &str = "secret-password";

/// Router wired to a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> String {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let router = app(AppState::new(config.clone(), store.clone()));
        Self { router, store, config }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await?.to_vec();
        Ok(TestResponse { status, headers, body })
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    /// Register `email` and return a bearer token for it
    pub async fn login_as(&self, email: &str) -> Result<String> {
        let credentials = json!({ "email": email, "password": PASSWORD });
        let res = self.post("/auth/register", None, credentials.clone()).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {}", res.text());

        let res = self.post("/auth/login", None, credentials).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.text());
        res.json()["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response without token")
    }

    /// Issue a certificate and return its id
    pub async fn create_certificate(&self, token: &str, title: &str) -> Result<String> {
        let res = self
            .post(
                "/api/qr-codes",
                Some(token),
                json!({
                    "title": title,
                    "clientName": "PT. Client",
                    "vessel": "TB Maju Jaya",
                    "quantity": "7,500 MT",
                    "ashContent": "5.2",
                }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "generate failed: {}", res.text());
        res.json()["data"]["id"]
            .as_str()
            .map(str::to_string)
            .context("generate response without id")
    }
}

/// Development preset with a cheap bcrypt cost and a fixed origin
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.backend = StoreBackend::Memory;
    config.security.password_hash_cost = 4;
    config.server.public_origin = Some("https://verify.example.com".to_string());
    config
}

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The real server binary on a free port, backed by the in-memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qrverify-api"));
        cmd.env("QRVERIFY_PORT", port.to_string())
            .env("SERVER_HOST", "127.0.0.1")
            .env("APP_ENV", "development")
            .env("DATABASE_BACKEND", "memory")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
