use super::RequestsLoggingLevel;

#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
    /// Tokens with access to the /system endpoints.
    pub admin_tokens: Vec<String>,
    /// Tokens accepted as authenticated but without admin access.
    pub query_tokens: Vec<String>,
}
