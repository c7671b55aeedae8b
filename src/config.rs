use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen: String,
    pub database_path: String,
    pub allowed_origins: Vec<String>,
    /// HS256 secret shared with the identity provider that issues access tokens.
    pub auth_secret: Option<String>,
    pub media_api_key: Option<String>,
    pub media_api_secret: Option<String>,
    pub media_token_ttl_secs: i64,
    pub assistant_api_key: Option<String>,
    pub assistant_model: String,
    pub assistant_endpoint: String,
    /// External realtime service that fans events out to connected clients.
    pub realtime_endpoint: Option<String>,
    pub external_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            database_path: "./hearth.sqlite3".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            auth_secret: None,
            media_api_key: None,
            media_api_secret: None,
            media_token_ttl_secs: 900,
            assistant_api_key: None,
            assistant_model: "gemini-2.0-flash-001".to_string(),
            assistant_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            realtime_endpoint: None,
            external_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Path::new("config.toml");
        if config_path.exists() {
            let mut file = std::fs::File::open(config_path).expect("failed to open config.toml");
            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .expect("failed to read config.toml");
            toml::from_str(&contents).expect("failed to parse config.toml")
        } else {
            let default_config = Config::default();
            let toml_string = toml::to_string_pretty(&default_config)
                .expect("failed to serialize default config");
            let mut file =
                std::fs::File::create(config_path).expect("failed to create config.toml");
            file.write_all(toml_string.as_bytes())
                .expect("failed to write config.toml");
            default_config
        }
    }

    pub fn from_env_config() -> Self {
        let mut final_cfg = Self::load();

        if final_cfg.auth_secret.is_none() {
            final_cfg.auth_secret = Some(uuid::Uuid::new_v4().to_string());
        }
        final_cfg
    }

    pub fn auth_secret_bytes(&self) -> &[u8] {
        self.auth_secret
            .as_ref()
            .expect("auth_secret must be set")
            .as_bytes()
    }
}
