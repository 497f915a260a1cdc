use crate::config::ServerConfig;
use crate::errors::ToolError;
use crate::managers::api::{ApiAction, ApiManager, ApiTool};
use crate::managers::info::InfoManager;
use crate::mcp::catalog::tool_catalog;
use crate::services::api_client::{ApiClient, ApiVerb};
use crate::services::logger::Logger;
use crate::services::token::default_token_extractors;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::validation::Validation;
use std::collections::HashMap;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: ServerConfig,
    pub api_client: Arc<ApiClient>,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(
        handlers: &HashMap<String, Arc<dyn ToolHandler>>,
    ) -> Result<(), ToolError> {
        let catalog: Vec<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();

        let mut missing: Vec<String> = catalog
            .iter()
            .filter(|name| !handlers.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        let mut undocumented: Vec<String> = handlers
            .keys()
            .filter(|name| !catalog.contains(&name.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() && undocumented.is_empty() {
            return Ok(());
        }
        missing.sort();
        undocumented.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint(
                "Every tool in tool_catalog.json needs a handler, and every handler needs a catalog entry.",
            )
            .with_details(serde_json::json!({
                "missing_handlers": missing,
                "missing_definitions": undocumented,
            })))
    }

    pub fn initialize(config: ServerConfig) -> Result<Self, ToolError> {
        let logger = Logger::new("api-bridge");
        let validation = Validation::new();

        let api_client = Arc::new(
            ApiClient::new(logger.clone(), config.api.clone())
                .map_err(|err| ToolError::internal(format!("API client setup failed: {}", err)))?,
        );

        let api_manager = Arc::new(ApiManager::new(
            logger.clone(),
            validation,
            api_client.clone(),
            default_token_extractors(),
        ));
        let info_manager = Arc::new(InfoManager::new(api_client.clone(), &config));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        for action in [
            ApiAction::Auth,
            ApiAction::Request(ApiVerb::Get),
            ApiAction::Request(ApiVerb::Post),
            ApiAction::Request(ApiVerb::Put),
            ApiAction::Request(ApiVerb::Patch),
            ApiAction::Request(ApiVerb::Delete),
            ApiAction::Logout,
        ] {
            handlers.insert(
                action.tool_name().to_string(),
                Arc::new(ApiTool::new(api_manager.clone(), action)),
            );
        }
        handlers.insert("get_info".to_string(), info_manager);

        Self::validate_tool_wiring(&handlers)?;

        let alias_map = crate::mcp::aliases::builtin_tool_alias_map_owned();
        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers, alias_map));

        logger.info(
            "initialized",
            Some(&serde_json::json!({
                "base_url": config.api.base_url.as_str(),
                "timeout_ms": config.api.timeout_ms(),
                "tools": tool_executor.tool_names(),
            })),
        );

        Ok(Self {
            logger,
            config,
            api_client,
            tool_executor,
        })
    }
}
