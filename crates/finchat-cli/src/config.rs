//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use finchat_chat::ChatConfig;
use finchat_llm::{AzureOpenAiProvider, CompletionConfig};
use finchat_pdf::{ConfiguredExtractor, PdfExtractor, PlainTextExtractor};
use finchat_registry::RegistryConfig;
use finchat_store::{AzureBlobStore, ConfiguredStore, LocalDirStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default blob container holding the reports
pub const DEFAULT_CONTAINER: &str = "chatbot-data";

const SECRET_MASK: &str = "********";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion service
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Where reports come from
    #[serde(default)]
    pub store: StoreSettings,

    /// Report chat
    #[serde(default)]
    pub chat: ChatConfig,

    /// Registry chat
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Document store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Azure Blob Storage container
    #[default]
    Azure,
    /// Local directory
    Local,
}

/// How report bytes become text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// PDF text layer
    #[default]
    Pdf,
    /// UTF-8 text files
    Text,
}

/// Document store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Backend
    pub kind: StoreKind,

    /// Storage account URL, e.g. `https://acct.blob.core.windows.net`
    pub account_url: String,

    /// Container name
    pub container: String,

    /// Shared access signature
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sas_token: String,

    /// Connection string, used instead of `account_url` + `sas_token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Report directory for the local backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_dir: Option<PathBuf>,

    /// Text extraction
    pub extractor: ExtractorKind,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Command history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".finchat").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults when it is missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Apply the process environment over file values.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(endpoint) = get("AZURE_OPENAI_ENDPOINT") {
            self.completion.endpoint = endpoint;
        }
        if let Some(api_key) = get("AZURE_OPENAI_API_KEY") {
            self.completion.api_key = api_key;
        }
        if let Some(sas_token) = get("AZURE_STORAGE_SAS_TOKEN") {
            self.store.sas_token = sas_token;
        }
        if let Some(connection_string) = get("AZURE_STORAGE_CONNECTION_STRING") {
            self.store.connection_string = Some(connection_string);
        }
    }

    /// Build the configured document store.
    pub fn build_store(&self) -> Result<ConfiguredStore> {
        let store = &self.store;
        match store.kind {
            StoreKind::Local => {
                let dir = store
                    .local_dir
                    .clone()
                    .ok_or_else(|| CliError::Config("store.local_dir must be set for the local store".into()))?;
                Ok(ConfiguredStore::Local(LocalDirStore::new(dir)))
            }
            StoreKind::Azure => {
                let blob_store = match &store.connection_string {
                    Some(connection_string) => {
                        AzureBlobStore::from_connection_string(connection_string, &store.container)?
                    }
                    None => {
                        if store.account_url.trim().is_empty() {
                            return Err(CliError::Config(
                                "store.account_url or a connection string must be set".into(),
                            ));
                        }
                        let sas_token = Some(store.sas_token.clone()).filter(|token| !token.is_empty());
                        AzureBlobStore::new(&store.account_url, &store.container, sas_token)?
                    }
                };
                Ok(ConfiguredStore::Azure(blob_store))
            }
        }
    }

    /// Build the configured text extractor.
    pub fn build_extractor(&self) -> ConfiguredExtractor {
        match self.store.extractor {
            ExtractorKind::Pdf => ConfiguredExtractor::Pdf(PdfExtractor::new()),
            ExtractorKind::Text => ConfiguredExtractor::Text(PlainTextExtractor),
        }
    }

    /// Build the completion provider.
    pub fn build_provider(&self) -> Result<AzureOpenAiProvider> {
        Ok(AzureOpenAiProvider::new(self.completion.clone())?)
    }

    /// Check the chat and registry sections.
    pub fn validate(&self) -> Result<()> {
        self.chat.validate().map_err(|e| CliError::Config(format!("[chat] {}", e)))?;
        self.registry
            .validate()
            .map_err(|e| CliError::Config(format!("[registry] {}", e)))?;
        Ok(())
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.completion.api_key.is_empty() {
            config.completion.api_key = SECRET_MASK.to_string();
        }
        if !config.store.sas_token.is_empty() {
            config.store.sas_token = SECRET_MASK.to_string();
        }
        if config.store.connection_string.is_some() {
            config.store.connection_string = Some(SECRET_MASK.to_string());
        }
        config
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            kind: StoreKind::Azure,
            account_url: String::new(),
            container: DEFAULT_CONTAINER.to_string(),
            sas_token: String::new(),
            connection_string: None,
            local_dir: None,
            extractor: ExtractorKind::Pdf,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            history_size: 1000,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_history_size() -> usize {
    1000
}
