use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub backend: BackendSettings,
    pub site: SiteSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendSettings {
    /// Assistant backend base URL
    pub url: String,
    /// Static bearer credential sent on every backend call
    pub api_key: String,
    #[serde(default = "BackendSettings::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    const fn default_timeout_secs() -> u64 {
        30
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteSettings {
    /// The site this deployment assists, e.g. `https://www.example.com`
    pub url: String,
    /// Secret for anti-forgery token derivation
    pub secret: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatSettings {
    #[serde(default = "ChatSettings::default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "ChatSettings::default_greeting")]
    pub greeting: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: Self::default_system_prompt(),
            greeting: Self::default_greeting(),
        }
    }
}

impl ChatSettings {
    fn default_system_prompt() -> String {
        "You are the assistant for this website. Answer visitors' questions \
         about the site's content, pages, and services. Be concise by default \
         and say so briefly when a question is outside the site's scope."
            .to_string()
    }

    fn default_greeting() -> String {
        "Hi! I'm the site assistant. Ask me anything about this site.".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        dirs::home_dir().map_or_else(
            || PathBuf::from("sessions.db"),
            |home| home.join("siteassist").join("sessions.db"),
        )
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("siteassist");

        let config_path = config_dir.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'siteassist init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// A missing credential is a configuration error that halts the feature,
    /// not a per-request failure.
    fn validate(&self) -> anyhow::Result<()> {
        if self.backend.api_key.trim().is_empty() {
            anyhow::bail!("backend.api_key is empty; the assistant cannot authenticate");
        }
        if self.backend.url.trim().is_empty() {
            anyhow::bail!("backend.url is empty");
        }
        if self.site.url.trim().is_empty() {
            anyhow::bail!("site.url is empty");
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("siteassist");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "backend": {
    "url": "https://assistant-backend.example.com",
    "api_key": "your-backend-api-key-here",
    "timeout_secs": 30
  },
  "site": {
    "url": "https://www.example.com",
    "secret": "generate-a-long-random-secret-here"
  },
  "chat": {
    "system_prompt": "You are the assistant for this website. Answer visitors' questions about the site's content, pages, and services. Be concise by default and say so briefly when a question is outside the site's scope.",
    "greeting": "Hi! I'm the site assistant. Ask me anything about this site."
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("   1. Edit the config file and add your backend API key");
        println!("   2. Set site.url to the site this assistant serves");
        println!("   3. Run 'siteassist activate' to provision the site");
        println!("   4. Run 'siteassist chat --user <id>' to start a conversation");
        println!();
        Ok(())
    }
}
