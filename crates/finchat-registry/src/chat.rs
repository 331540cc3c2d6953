//! Question answering over registry search results

use crate::client::{BrregClient, DEFAULT_BASE_URL};
use crate::export::write_csv;
use crate::record::EntityRecord;
use crate::RegistryError;
use finchat_chat::{Answer, DEFAULT_SYSTEM_INSTRUCTION};
use finchat_domain::CompletionProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// File name suffix of a CSV export, after the entity name
pub const CSV_FILE_SUFFIX: &str = "_entities_clean.csv";

/// Source of entity search results
///
/// Implemented by [`BrregClient`]; tests substitute canned responses.
pub trait EntityDirectory {
    /// Search entities by name, returning the raw search response
    fn search_entities(&self, name: &str) -> impl Future<Output = Result<Value, RegistryError>> + Send;
}

impl EntityDirectory for BrregClient {
    async fn search_entities(&self, name: &str) -> Result<Value, RegistryError> {
        BrregClient::search_entities(self, name).await
    }
}

/// Configuration for the registry chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry host
    pub base_url: String,

    /// Directory CSV exports are written to
    pub export_dir: PathBuf,

    /// System instruction for the completion service
    pub system_instruction: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            export_dir: PathBuf::from("."),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }
        if self.system_instruction.trim().is_empty() {
            return Err("system_instruction cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Answers questions about one registry entity at a time
///
/// Search results are fetched once per entity name and reused for every later
/// question about that name. An empty entity name means "the entity asked
/// about last".
pub struct RegistryChat<D, C>
where
    D: EntityDirectory,
    C: CompletionProvider,
{
    directory: D,
    provider: C,
    config: RegistryConfig,
    records: HashMap<String, Vec<EntityRecord>>,
    current_entity: Option<String>,
}

impl<D, C> RegistryChat<D, C>
where
    D: EntityDirectory,
    C: CompletionProvider,
    C::Error: Display,
{
    /// Create a chat with nothing cached
    pub fn new(directory: D, provider: C, config: RegistryConfig) -> Self {
        Self {
            directory,
            provider,
            config,
            records: HashMap::new(),
            current_entity: None,
        }
    }

    /// Entity the last question was about
    pub fn current_entity(&self) -> Option<&str> {
        self.current_entity.as_deref()
    }

    /// Cached records for `entity`, if it has been searched
    pub fn cached_records(&self, entity: &str) -> Option<&[EntityRecord]> {
        self.records.get(entity.trim()).map(Vec::as_slice)
    }

    /// Answer `question` about `entity`
    ///
    /// A question mentioning both "download" and "csv" writes the entity's
    /// records to `{export_dir}/{entity}_entities_clean.csv` (separators in the
    /// entity become `_`) instead of calling the completion service.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The question is empty
    /// - No entity is given and none was asked about before
    /// - The registry has no data for the entity
    /// - The registry cannot be reached, or the export cannot be written
    pub async fn answer(&mut self, entity: &str, question: &str) -> Result<Answer, RegistryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RegistryError::Validation("Please enter a question.".to_string()));
        }

        let entity = match (entity.trim(), &self.current_entity) {
            ("", Some(current)) => current.clone(),
            ("", None) => {
                return Err(RegistryError::Validation("Please enter an entity name.".to_string()))
            }
            (name, _) => name.to_string(),
        };

        self.ensure_records(&entity).await?;
        self.current_entity = Some(entity.clone());
        let records = self.records.get(&entity).map(Vec::as_slice).unwrap_or_default();

        if wants_csv(question) {
            let path = self.config.export_dir.join(export_file_name(&entity));
            write_csv(records, &path).await?;
            return Ok(Answer::completed(format!(
                "Data for {} has been downloaded in clean CSV format for Excel.",
                entity
            )));
        }

        let data = serde_json::to_string(records)
            .map_err(|e| RegistryError::InvalidResponse(format!("Failed to serialize records: {}", e)))?;
        let prompt = build_prompt(&data, question);
        debug!("Prompt length: {} chars", prompt.len());

        let answer = match self
            .provider
            .complete(&self.config.system_instruction, &prompt)
            .await
        {
            Ok(text) => Answer::completed(text),
            Err(e) => {
                warn!("Completion failed: {}", e);
                Answer::failed(e.to_string())
            }
        };
        Ok(answer)
    }

    async fn ensure_records(&mut self, entity: &str) -> Result<(), RegistryError> {
        if self.records.contains_key(entity) {
            debug!("Reusing cached records for {}", entity);
            return Ok(());
        }

        let response = match self.directory.search_entities(entity).await {
            Ok(response) => response,
            Err(RegistryError::Status { status, .. }) => {
                warn!("Entity search for {} failed with HTTP {}", entity, status);
                return Err(RegistryError::NoData(entity.to_string()));
            }
            Err(e) => return Err(e),
        };

        let records = EntityRecord::flatten(&response);
        if records.is_empty() {
            return Err(RegistryError::NoData(entity.to_string()));
        }

        info!("Registry returned {} entities for {}", records.len(), entity);
        self.records.insert(entity.to_string(), records);
        Ok(())
    }
}

fn wants_csv(question: &str) -> bool {
    let lower = question.to_lowercase();
    lower.contains("download") && lower.contains("csv")
}

/// CSV export file name, with path separators in the entity flattened to `_`
fn export_file_name(entity: &str) -> String {
    format!("{}{}", entity.replace(['/', '\\', ':'], "_"), CSV_FILE_SUFFIX)
}

fn build_prompt(data: &str, question: &str) -> String {
    format!(
        "The following is data from the Brønnøysund Register Centre:\n\n{}\n\nAnswer the following question: {}",
        data, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchat_llm::{LlmError, MockProvider};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Directory with canned search responses that counts searches
    #[derive(Clone, Default)]
    struct FakeDirectory {
        responses: HashMap<String, Value>,
        searches: Arc<Mutex<Vec<String>>>,
    }

    impl FakeDirectory {
        fn with(mut self, name: &str, response: Value) -> Self {
            self.responses.insert(name.to_string(), response);
            self
        }

        fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    impl EntityDirectory for FakeDirectory {
        async fn search_entities(&self, name: &str) -> Result<Value, RegistryError> {
            self.searches.lock().unwrap().push(name.to_string());
            self.responses.get(name).cloned().ok_or(RegistryError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
        }
    }

    fn equinor() -> Value {
        json!({
            "_embedded": {
                "enheter": [
                    { "organisasjonsnummer": "923609016", "navn": "EQUINOR ASA" }
                ]
            }
        })
    }

    fn chat_with(
        directory: &FakeDirectory,
        llm: &MockProvider,
        export_dir: PathBuf,
    ) -> RegistryChat<FakeDirectory, MockProvider> {
        let config = RegistryConfig {
            export_dir,
            ..RegistryConfig::default()
        };
        RegistryChat::new(directory.clone(), llm.clone(), config)
    }

    #[tokio::test]
    async fn test_answer_uses_registry_data() {
        let directory = FakeDirectory::default().with("Equinor", equinor());
        let llm = MockProvider::new("Equinor ASA is registered in Stavanger.");
        let mut chat = chat_with(&directory, &llm, PathBuf::from("."));

        let answer = chat.answer("Equinor", "Where is it registered?").await.unwrap();
        assert_eq!(answer.text, "Equinor ASA is registered in Stavanger.");

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.starts_with("The following is data from the Brønnøysund Register Centre:\n\n["));
        assert!(prompt.contains("\"organisasjonsnummer\":\"923609016\""));
        assert!(prompt.ends_with("\n\nAnswer the following question: Where is it registered?"));
    }

    #[tokio::test]
    async fn test_records_cached_per_entity() {
        let directory = FakeDirectory::default().with("Equinor", equinor());
        let llm = MockProvider::default();
        let mut chat = chat_with(&directory, &llm, PathBuf::from("."));

        chat.answer("Equinor", "First?").await.unwrap();
        chat.answer("Equinor", "Second?").await.unwrap();
        chat.answer("", "Third?").await.unwrap();

        assert_eq!(directory.searches(), vec!["Equinor"]);
        assert_eq!(llm.call_count(), 3);
        assert_eq!(chat.current_entity(), Some("Equinor"));
        assert_eq!(chat.cached_records("Equinor").map(|r| r.len()), Some(1));
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let directory = FakeDirectory::default();
        let llm = MockProvider::default();
        let mut chat = chat_with(&directory, &llm, PathBuf::from("."));

        let err = chat.answer("Equinor", " ").await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter a question.");

        let err = chat.answer("", "Where?").await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter an entity name.");

        assert!(directory.searches().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_entity_is_no_data() {
        let directory = FakeDirectory::default()
            .with("Nobody", json!({ "page": { "totalElements": 0 } }));
        let llm = MockProvider::default();
        let mut chat = chat_with(&directory, &llm, PathBuf::from("."));

        let err = chat.answer("Nobody", "Who?").await.unwrap_err();
        assert_eq!(err.user_message(), "Could not retrieve data for Nobody from brreg.");

        let err = chat.answer("Missing", "Who?").await.unwrap_err();
        assert!(matches!(err, RegistryError::NoData(name) if name == "Missing"));
        assert_eq!(llm.call_count(), 0);
        assert_eq!(chat.current_entity(), None);
    }

    #[tokio::test]
    async fn test_download_csv_request_writes_file() {
        let dir = TempDir::new().unwrap();
        let directory = FakeDirectory::default().with("Equinor", equinor());
        let llm = MockProvider::default();
        let mut chat = chat_with(&directory, &llm, dir.path().to_path_buf());

        let answer = chat
            .answer("Equinor", "Please Download this as CSV")
            .await
            .unwrap();

        assert_eq!(
            answer.text,
            "Data for Equinor has been downloaded in clean CSV format for Excel."
        );
        assert_eq!(llm.call_count(), 0);
        let contents = std::fs::read_to_string(dir.path().join("Equinor_entities_clean.csv")).unwrap();
        assert!(contents.contains("EQUINOR ASA"));
    }

    #[tokio::test]
    async fn test_csv_export_stays_in_export_dir() {
        let root = TempDir::new().unwrap();
        let export_dir = root.path().join("exports");
        std::fs::create_dir(&export_dir).unwrap();
        let directory = FakeDirectory::default()
            .with("ACME A/S", equinor())
            .with("../escaped", equinor());
        let llm = MockProvider::default();
        let mut chat = chat_with(&directory, &llm, export_dir.clone());

        chat.answer("ACME A/S", "download csv").await.unwrap();
        chat.answer("../escaped", "download csv").await.unwrap();

        assert!(export_dir.join("ACME A_S_entities_clean.csv").is_file());
        assert!(export_dir.join(".._escaped_entities_clean.csv").is_file());
        assert!(!root.path().join("escaped_entities_clean.csv").exists());
        let mut written: Vec<_> = std::fs::read_dir(&export_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        written.sort();
        assert_eq!(written, vec![".._escaped_entities_clean.csv", "ACME A_S_entities_clean.csv"]);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Equinor"), "Equinor_entities_clean.csv");
        assert_eq!(export_file_name("/etc/passwd"), "_etc_passwd_entities_clean.csv");
        assert_eq!(export_file_name("C:\\temp"), "C__temp_entities_clean.csv");
    }

    #[tokio::test]
    async fn test_completion_failure_becomes_answer() {
        let directory = FakeDirectory::default().with("Equinor", equinor());
        let llm = MockProvider::failing(LlmError::Communication("timed out".to_string()));
        let mut chat = chat_with(&directory, &llm, PathBuf::from("."));

        let answer = chat.answer("Equinor", "Where?").await.unwrap();
        assert!(answer.is_error());
        assert_eq!(answer.text, "Error with OpenAI API: Communication error: timed out");
    }

    #[test]
    fn test_wants_csv() {
        assert!(wants_csv("download the csv please"));
        assert!(!wants_csv("download the report"));
        assert!(!wants_csv("what is in the csv?"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(RegistryConfig::default().validate().is_ok());
        let config = RegistryConfig {
            base_url: "data.brreg.no".to_string(),
            ..RegistryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
