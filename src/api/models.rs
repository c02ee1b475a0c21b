/// Configuration for the fetch application
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub default_url: String,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_url: "http://example.com".to_string(),
            user_agent: "simple-html-fetcher/0.1".to_string(),
        }
    }
}
