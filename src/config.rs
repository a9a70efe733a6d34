use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub openai_api_key: String,
    pub api_base_url: String,
    pub chat_model: String,
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
    pub system_prompt: String,
    pub vision_model: String,
    pub vision_instruction: String,
    pub vision_max_tokens: u32,
    pub whisper_model: String,
    pub image_model: String,
    pub image_size: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            chat_max_tokens: 200,
            chat_temperature: 0.7,
            system_prompt: "Eres un asistente virtual experto en videojuegos.".to_string(),
            vision_model: "gpt-4o-mini".to_string(),
            vision_instruction: "Describe detalladamente esta imagen.".to_string(),
            vision_max_tokens: 500,
            whisper_model: "whisper-1".to_string(),
            image_model: "dall-e-2".to_string(),
            image_size: "512x512".to_string(),
            port: 3000,
            upload_dir: default_upload_dir(),
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

fn default_upload_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("chatbot-relay")
        .join("uploads")
}

/// Directory holding `config.json` unless `RELAY_CONFIG` points elsewhere.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatbot-relay"))
}

impl RelayConfig {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Self {
        let file = std::env::var("RELAY_CONFIG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| default_config_dir().map(|dir| dir.join("config.json")));

        let mut config = match file {
            Some(path) => Self::from_file(&path),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Environment wins over the file so secrets never have to live on disk.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai_api_key = key;
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(port) = non_empty("PORT") {
            match port.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
        if let Some(dir) = non_empty("UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }

    /// Join an operation path onto the provider base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
