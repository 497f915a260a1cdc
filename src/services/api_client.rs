use crate::config::ApiConfig;
use crate::constants::{
    headers as header_constants, limits::LOG_SUBSTRING_LENGTH, protocols::ALLOWED_HTTP,
};
use crate::errors::ApiError;
use crate::services::auth_state::{AuthState, AuthStatus};
use crate::services::logger::Logger;
use crate::utils::redact::redact_text;
use crate::utils::text::truncate_utf8_prefix;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Instant;
use url::{Position, Url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ApiVerb {
    pub fn method(self) -> Method {
        match self {
            ApiVerb::Get => Method::GET,
            ApiVerb::Post => Method::POST,
            ApiVerb::Put => Method::PUT,
            ApiVerb::Patch => Method::PATCH,
            ApiVerb::Delete => Method::DELETE,
        }
    }

    pub fn has_body(self) -> bool {
        matches!(self, ApiVerb::Post | ApiVerb::Put | ApiVerb::Patch)
    }
}

/// One outgoing call, before defaults and auth are layered in.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub verb: ApiVerb,
    pub endpoint: String,
    pub params: Option<Map<String, Value>>,
    pub body: Option<Value>,
    /// Per-call headers; applied last, so they win over every other layer.
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(verb: ApiVerb, endpoint: impl Into<String>) -> Self {
        Self {
            verb,
            endpoint: endpoint.into(),
            params: None,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Option<Map<String, Value>>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

/// HTTP client bound to one base service and one authentication identity.
pub struct ApiClient {
    logger: Logger,
    config: ApiConfig,
    http: Client,
    auth: AuthState,
}

impl ApiClient {
    pub fn new(logger: Logger, config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .build()
            .map_err(|err| ApiError::Network(format!("Failed to build HTTP client: {}", err)))?;
        let auth = AuthState::new(config.auth_token.clone());
        Ok(Self {
            logger: logger.child("client"),
            config,
            http,
            auth,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn set_auth_token(&self, token: Option<String>) {
        let previous = self.auth.set(token);
        self.logger.info(
            "auth token updated",
            Some(&serde_json::json!({
                "had_token": previous.is_some(),
                "status": format!("{:?}", self.auth.status()),
            })),
        );
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth.get()
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth.status()
    }

    pub async fn get(
        &self,
        endpoint: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(ApiVerb::Get, endpoint).with_params(params))
            .await
    }

    pub async fn post(&self, endpoint: &str, body: Option<Value>) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(ApiVerb::Post, endpoint).with_body(body))
            .await
    }

    pub async fn put(&self, endpoint: &str, body: Option<Value>) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(ApiVerb::Put, endpoint).with_body(body))
            .await
    }

    pub async fn patch(
        &self,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(ApiVerb::Patch, endpoint).with_body(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::new(ApiVerb::Delete, endpoint))
            .await
    }

    /// Resolves `endpoint` against the base URL and appends non-null params in
    /// the order given. Absolute endpoints replace the base entirely.
    pub fn build_url(
        &self,
        endpoint: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<Url, ApiError> {
        let mut url = self
            .config
            .base_url
            .join(endpoint)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {}", endpoint, err)))?;
        let scheme = format!("{}:", url.scheme());
        if !ALLOWED_HTTP.contains(&scheme.as_str()) {
            return Err(ApiError::InvalidUrl(format!(
                "{}: only http/https URLs are supported",
                endpoint
            )));
        }

        let pairs = params.map(query_pairs).unwrap_or_default();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Layers headers: defaults, then the static key, then the bearer token,
    /// then per-call overrides.
    pub fn build_headers(&self, overrides: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.config.headers {
            insert_header(&mut map, name, value)?;
        }
        if let Some(key) = self.config.api_key.as_deref() {
            insert_header(&mut map, header_constants::STATIC_KEY, key)?;
        }
        if let Some(token) = self.auth.get() {
            let value = format!("{}{}", header_constants::BEARER_PREFIX, token);
            let value = HeaderValue::from_str(&value)
                .map_err(|_| ApiError::InvalidHeader("Authorization".to_string()))?;
            map.insert(AUTHORIZATION, value);
        }
        for (name, value) in overrides {
            insert_header(&mut map, name, value)?;
        }
        Ok(map)
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.build_url(&request.endpoint, request.params.as_ref())?;
        let headers = self.build_headers(&request.headers)?;
        let method = request.verb.method();

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers);
        if request.verb.has_body() {
            if let Some(body) = request.body.as_ref() {
                builder = builder.json(body);
            }
        }

        let timeout_ms = self.config.timeout_ms();
        let started = Instant::now();
        self.logger.debug(
            "request started",
            Some(&serde_json::json!({
                "method": method.as_str(),
                "url": loggable_url(&url),
                "query_params": url.query_pairs().count(),
            })),
        );

        // Dropping the round-trip future on expiry cancels the in-flight
        // request; the timer lives inside the `Timeout` future and goes with it.
        let outcome = tokio::time::timeout(self.config.timeout, round_trip(builder)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout { timeout_ms }),
        };

        match &result {
            Ok(response) => self.logger.debug(
                "request completed",
                Some(&serde_json::json!({
                    "method": method.as_str(),
                    "url": loggable_url(&url),
                    "status": response.status,
                    "duration_ms": elapsed_ms,
                })),
            ),
            Err(err) => self.logger.warn(
                "request failed",
                Some(&serde_json::json!({
                    "method": method.as_str(),
                    "url": loggable_url(&url),
                    "kind": err.kind(),
                    "error": truncate_utf8_prefix(&redact_text(&err.to_string()), LOG_SUBSTRING_LENGTH),
                    "duration_ms": elapsed_ms,
                })),
            ),
        }
        result
    }
}

// Caller-supplied query values can carry credentials, so logs stop at the path.
fn loggable_url(url: &Url) -> &str {
    &url[..Position::AfterPath]
}

async fn round_trip(builder: RequestBuilder) -> Result<ApiResponse, ApiError> {
    let response = builder.send().await?;
    let status = response.status();
    let headers = headers_to_map(response.headers());
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains(header_constants::CONTENT_TYPE_JSON))
        .unwrap_or(false);

    let bytes = response.bytes().await?;
    let data = decode_body(&bytes, is_json);

    if !status.is_success() {
        return Err(ApiError::HttpStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body: data,
        });
    }

    Ok(ApiResponse {
        data,
        status: status.as_u16(),
        headers,
    })
}

fn decode_body(bytes: &[u8], is_json: bool) -> Value {
    let text = String::from_utf8_lossy(bytes);
    if is_json {
        if text.trim().is_empty() {
            return Value::Null;
        }
        if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
            return parsed;
        }
    }
    Value::String(text.into_owned())
}

fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|item| !item.is_null()) {
                    pairs.push((key.clone(), stringify_param(item)));
                }
            }
            other => pairs.push((key.clone(), stringify_param(other))),
        }
    }
    pairs
}

fn stringify_param(value: &Value) -> String {
    value
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}

fn insert_header(map: &mut HeaderMap, name: &str, value: &str) -> Result<(), ApiError> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    map.insert(header_name, header_value);
    Ok(())
}

// Repeated headers are joined with ", " so each name maps to one string.
fn headers_to_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in headers {
        let Ok(text) = value.to_str() else {
            continue;
        };
        out.entry(key.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(text);
            })
            .or_insert_with(|| text.to_string());
    }
    out
}
