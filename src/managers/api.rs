use crate::errors::{ApiError, ToolError};
use crate::mcp::envelope::{
    failure_envelope, failure_meta, success_envelope, timestamp_now, ToolOutcome,
};
use crate::services::api_client::{ApiClient, ApiRequest, ApiVerb};
use crate::services::logger::Logger;
use crate::services::token::{extract_token, field_extractor, TokenExtractor};
use crate::services::tool_executor::ToolHandler;
use crate::services::validation::Validation;
use serde_json::{json, Value};
use std::sync::Arc;

/// Which tool a handler instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Request(ApiVerb),
    Auth,
    Logout,
}

impl ApiAction {
    pub fn tool_name(self) -> &'static str {
        match self {
            ApiAction::Request(ApiVerb::Get) => "api_get",
            ApiAction::Request(ApiVerb::Post) => "api_post",
            ApiAction::Request(ApiVerb::Put) => "api_put",
            ApiAction::Request(ApiVerb::Patch) => "api_patch",
            ApiAction::Request(ApiVerb::Delete) => "api_delete",
            ApiAction::Auth => "api_auth",
            ApiAction::Logout => "api_logout",
        }
    }
}

fn success_summary(verb: ApiVerb, endpoint: &str) -> String {
    match verb {
        ApiVerb::Get => format!("Successfully retrieved data from {}", endpoint),
        ApiVerb::Post => format!("Data successfully sent to {}", endpoint),
        ApiVerb::Put => format!("Data successfully updated in {}", endpoint),
        ApiVerb::Patch => format!("Data successfully patched in {}", endpoint),
        ApiVerb::Delete => format!("Data successfully deleted from {}", endpoint),
    }
}

fn failure_summary(verb: ApiVerb, endpoint: &str, error: &ApiError) -> String {
    let prefix = match verb {
        ApiVerb::Get => "Error requesting",
        ApiVerb::Post => "Error sending to",
        ApiVerb::Put => "Error updating",
        ApiVerb::Patch => "Error patching",
        ApiVerb::Delete => "Error deleting from",
    };
    format!("{} {}: {}", prefix, endpoint, error)
}

/// Adapts tool invocations onto the shared [`ApiClient`].
#[derive(Clone)]
pub struct ApiManager {
    logger: Logger,
    validation: Validation,
    client: Arc<ApiClient>,
    token_extractors: Arc<Vec<TokenExtractor>>,
}

impl ApiManager {
    pub fn new(
        logger: Logger,
        validation: Validation,
        client: Arc<ApiClient>,
        token_extractors: Vec<TokenExtractor>,
    ) -> Self {
        Self {
            logger: logger.child("api"),
            validation,
            client,
            token_extractors: Arc::new(token_extractors),
        }
    }

    pub async fn handle_action(
        &self,
        action: ApiAction,
        args: Value,
    ) -> Result<ToolOutcome, ToolError> {
        match action {
            ApiAction::Request(verb) => self.request(verb, &args).await,
            ApiAction::Auth => self.auth(&args).await,
            ApiAction::Logout => Ok(self.logout()),
        }
    }

    async fn request(&self, verb: ApiVerb, args: &Value) -> Result<ToolOutcome, ToolError> {
        let endpoint = self
            .validation
            .ensure_string(args.get("endpoint"), "endpoint", true)?;
        let params = if verb == ApiVerb::Get {
            self.validation
                .ensure_optional_object(args.get("params"), "params")?
        } else {
            None
        };
        let body = if verb.has_body() {
            args.get("data").filter(|v| !v.is_null()).cloned()
        } else {
            None
        };

        let request = ApiRequest::new(verb, endpoint.clone())
            .with_params(params)
            .with_body(body);

        let outcome = match self.client.execute(request).await {
            Ok(response) => ToolOutcome::new(
                success_envelope(&endpoint, &response),
                success_summary(verb, &endpoint),
            )
            .with_meta(json!({ "responseHeaders": response.headers })),
            Err(err) => ToolOutcome::new(
                failure_envelope(&endpoint, &err),
                failure_summary(verb, &endpoint, &err),
            )
            .with_meta(failure_meta(&err)),
        };
        Ok(outcome)
    }

    async fn auth(&self, args: &Value) -> Result<ToolOutcome, ToolError> {
        let endpoint = self
            .validation
            .ensure_string(args.get("endpoint"), "endpoint", true)?;
        let credentials = self
            .validation
            .ensure_object(args.get("credentials"), "credentials")?;
        // Field names are case-sensitive and kept verbatim; an empty name means
        // the default chain alone.
        let token_field = args
            .get("tokenField")
            .and_then(Value::as_str)
            .filter(|field| !field.is_empty())
            .map(str::to_string);

        let response = match self
            .client
            .post(&endpoint, Some(Value::Object(credentials)))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return Ok(ToolOutcome::new(
                    json!({
                        "success": false,
                        "error": err.to_string(),
                        "endpoint": endpoint,
                        "timestamp": timestamp_now(),
                    }),
                    format!("Authorization failed: {}", err),
                )
                .with_meta(failure_meta(&err)));
            }
        };

        let mut extractors: Vec<TokenExtractor> = Vec::with_capacity(self.token_extractors.len() + 1);
        if let Some(field) = token_field.as_ref() {
            extractors.push(field_extractor(field.clone()));
        }
        extractors.extend(self.token_extractors.iter().cloned());

        let Some(token) = extract_token(&response.data, &extractors) else {
            self.logger.warn(
                "login response carried no token",
                Some(&json!({
                    "endpoint": endpoint,
                    "status": response.status,
                    "token_field": token_field,
                })),
            );
            let err = ApiError::TokenNotFound;
            return Ok(ToolOutcome::new(
                json!({
                    "success": false,
                    "error": err.to_string(),
                    "endpoint": endpoint,
                    "responseData": response.data,
                    "timestamp": timestamp_now(),
                }),
                "Authorization response received but token not found. Check tokenField parameter or response structure.",
            )
            .with_meta(failure_meta(&err)));
        };

        self.client.set_auth_token(Some(token));
        Ok(ToolOutcome::new(
            json!({
                "success": true,
                "message": "Authorized successfully",
                "tokenStored": true,
                "endpoint": endpoint,
                "status": response.status,
                "timestamp": timestamp_now(),
            }),
            "Authorized successfully. Token stored for subsequent requests.",
        )
        .with_meta(json!({ "responseHeaders": response.headers })))
    }

    fn logout(&self) -> ToolOutcome {
        let had_token = self.client.auth_token().is_some();
        self.client.set_auth_token(None);
        let summary = if had_token {
            "Stored token cleared. Subsequent requests are unauthenticated."
        } else {
            "No token was stored."
        };
        ToolOutcome::new(
            json!({
                "success": true,
                "tokenCleared": had_token,
                "timestamp": timestamp_now(),
            }),
            summary,
        )
    }
}

/// Binds one [`ApiAction`] to the shared manager so each tool name gets its
/// own handler entry.
pub struct ApiTool {
    manager: Arc<ApiManager>,
    action: ApiAction,
}

impl ApiTool {
    pub fn new(manager: Arc<ApiManager>, action: ApiAction) -> Self {
        Self { manager, action }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ApiTool {
    async fn handle(&self, args: Value) -> Result<ToolOutcome, ToolError> {
        self.manager.handle_action(self.action, args).await
    }
}
