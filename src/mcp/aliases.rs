use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const BUILTIN_TOOL_ALIASES: &[(&str, &str)] = &[
    ("auth", "api_auth"),
    ("get", "api_get"),
    ("post", "api_post"),
    ("put", "api_put"),
    ("patch", "api_patch"),
    ("delete", "api_delete"),
    ("logout", "api_logout"),
    ("info", "get_info"),
];

static BUILTIN_TOOL_ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| BUILTIN_TOOL_ALIASES.iter().copied().collect());

pub fn canonical_tool_name(tool: &str) -> &str {
    BUILTIN_TOOL_ALIAS_MAP.get(tool).copied().unwrap_or(tool)
}

pub fn builtin_tool_alias_map_owned() -> HashMap<String, String> {
    BUILTIN_TOOL_ALIASES
        .iter()
        .map(|(alias, target)| (alias.to_string(), target.to_string()))
        .collect()
}
