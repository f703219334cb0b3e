use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub index_name: String,
    pub bucket_name: String,
    /// Lifetime of presigned upload URLs, in seconds.
    pub url_expiration: u64,
    /// When set, the DynamoDB client targets a local endpoint instead of AWS.
    pub is_offline: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            table_name: env::var("TODOS_TABLE").unwrap_or_else(|_| "todo-items".to_string()),
            index_name: env::var("USER_ID_INDEX").unwrap_or_else(|_| "UserIdIndex".to_string()),
            bucket_name: env::var("ATTACHMENTS_BUCKET")
                .unwrap_or_else(|_| "todo-attachments".to_string()),
            url_expiration: env::var("SIGNED_URL_EXPIRATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
            is_offline: env::var("IS_OFFLINE").is_ok(),
        }
    }
}
