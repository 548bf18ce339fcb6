use std::env;
use std::path::PathBuf;

/// Key the bearer token is persisted under.
pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
}

impl AppConfig {
    pub fn new(api_base_url: &str, storage_path: PathBuf) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_path,
        }
    }

    /// File backing the persisted key/value storage (the session token lives here).
    pub fn storage_file(&self) -> PathBuf {
        self.storage_path.join("storage.json")
    }

    pub fn with_api_base_url(self, api_base_url: &str) -> Self {
        Self::new(api_base_url, self.storage_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_base_url = env::var("LEADBOOK_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let storage_path = env::var("LEADBOOK_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_local_dir()
                    .map(|dir| dir.join("leadbook"))
                    .unwrap_or_else(|| PathBuf::from("./"))
            });

        Self::new(&api_base_url, storage_path)
    }
}
