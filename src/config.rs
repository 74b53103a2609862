use anyhow::Result;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub max_file_size: usize,
    pub openai_key: Option<String>,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        // The key is optional: without it the service still analyzes
        // uploads and serves rule-based recommendations.
        let openai_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Config {
            max_file_size: 10 * 1024 * 1024, // 10MB
            openai_key,
        })
    }
}
