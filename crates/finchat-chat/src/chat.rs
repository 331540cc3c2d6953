//! Core ReportChat implementation

use crate::config::ChatConfig;
use crate::error::ChatError;
use crate::prompt::PromptBuilder;
use crate::types::Answer;
use finchat_domain::{
    normalize_identifiers, resolve, CompletionProvider, DocumentStore, ReportText, SessionState,
    TextExtractor,
};
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, info, warn};

/// Answers questions about one or more reports from a document store
///
/// Reports are fetched and extracted the first time a question needs them and
/// kept for the rest of the session. Every question is answered from all
/// reports seen so far.
pub struct ReportChat<S, X, C>
where
    S: DocumentStore,
    X: TextExtractor,
    C: CompletionProvider,
{
    store: S,
    extractor: X,
    provider: C,
    config: ChatConfig,
    session: SessionState,
    catalog: Option<Vec<String>>,
}

impl<S, X, C> ReportChat<S, X, C>
where
    S: DocumentStore,
    X: TextExtractor,
    C: CompletionProvider,
    S::Error: Display,
    X::Error: Display,
    C::Error: Display,
{
    /// Create a chat with an empty session
    pub fn new(store: S, extractor: X, provider: C, config: ChatConfig) -> Self {
        Self {
            store,
            extractor,
            provider,
            config,
            session: SessionState::new(),
            catalog: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Reports fetched so far
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Store names loaded so far, if the catalog has been read
    pub fn catalog(&self) -> Option<&[String]> {
        self.catalog.as_deref()
    }

    /// Store names, reading the catalog on first use
    pub async fn available_reports(&mut self) -> Result<&[String], ChatError> {
        if self.catalog.is_none() {
            self.reload_catalog().await?;
        }
        Ok(self.catalog.as_deref().unwrap_or_default())
    }

    /// Re-read the store's report names
    pub async fn reload_catalog(&mut self) -> Result<&[String], ChatError> {
        let names = self
            .store
            .list_names()
            .await
            .map_err(|e| ChatError::Catalog(e.to_string()))?;

        info!("Store offers {} reports", names.len());
        Ok(self.catalog.insert(names).as_slice())
    }

    /// Answer `question` using the reports named in `raw_identifiers`
    ///
    /// `raw_identifiers` is a comma-separated list such as
    /// `"Equinor 2020, Equinor 2021"`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The identifier list or the question is empty
    /// - No identifier matches a report in the store
    /// - A report cannot be fetched or extracted (earlier reports stay cached)
    /// - The assembled prompt exceeds `max_prompt_chars` (the reports fetched
    ///   for this question are then discarded, so the session stays usable)
    ///
    /// A failed completion call is not an error: it comes back as an
    /// [`Answer`] whose `failure` is set.
    pub async fn answer_question(
        &mut self,
        raw_identifiers: &str,
        question: &str,
    ) -> Result<Answer, ChatError> {
        let identifiers = normalize_identifiers(raw_identifiers, &self.config.document_suffix);
        let question = question.trim();
        if identifiers.is_empty() || question.is_empty() {
            return Err(ChatError::Validation);
        }

        let resolved = resolve(&identifiers, self.available_reports().await?);
        if resolved.is_empty() {
            info!("No reports match {} identifiers", identifiers.len());
            return Err(ChatError::NotFound);
        }
        debug!("Resolved {} identifiers to {:?}", identifiers.len(), resolved);

        let mut staged: Vec<(String, String)> = Vec::new();
        for name in &resolved {
            if self.session.contains(name) {
                debug!("Reusing extracted text of {}", name);
                continue;
            }
            match self.retrieve(name).await {
                Ok(text) => staged.push((name.clone(), text)),
                Err(e) => {
                    warn!("{}", e);
                    self.commit(staged);
                    return Err(e);
                }
            }
        }

        let prompt = staged
            .iter()
            .fold(PromptBuilder::from_session(&self.session, question), |builder, (name, text)| {
                builder.with_report(name, text)
            })
            .build();
        let prompt_chars = prompt.chars().count();
        if prompt_chars > self.config.max_prompt_chars {
            warn!(
                "Prompt of {} chars exceeds limit of {}; discarding {} new reports",
                prompt_chars,
                self.config.max_prompt_chars,
                staged.len()
            );
            return Err(ChatError::PromptTooLarge(prompt_chars, self.config.max_prompt_chars));
        }
        let newly_fetched = self.commit(staged);

        info!(
            "Asking about {} reports ({} prompt chars)",
            self.session.len(),
            prompt_chars
        );

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

        Ok(answer.with_reports(resolved, newly_fetched))
    }

    /// Move staged reports into the session, returning their names
    fn commit(&mut self, staged: Vec<(String, String)>) -> Vec<String> {
        staged
            .into_iter()
            .map(|(name, text)| {
                self.session.insert(name.clone(), ReportText::new(text));
                name
            })
            .collect()
    }

    /// Fetch, optionally save, and extract one report
    async fn retrieve(&self, name: &str) -> Result<String, ChatError> {
        let failed = |reason: String| ChatError::Retrieval {
            report: name.to_string(),
            reason,
        };

        let bytes = self
            .store
            .fetch_bytes(name)
            .await
            .map_err(|e| failed(e.to_string()))?;
        debug!("Fetched {} ({} bytes)", name, bytes.len());

        if let Some(dir) = &self.config.download_dir {
            save_copy(dir, name, &bytes)
                .await
                .map_err(|e| failed(format!("could not save copy: {}", e)))?;
        }

        let text = self.extractor.extract(&bytes).map_err(|e| failed(e.to_string()))?;
        info!("Extracted text from {} ({} chars)", name, text.len());
        Ok(text)
    }
}

/// Write `bytes` to `{dir}/downloaded_{name}`, flattening any path separators in `name`
async fn save_copy(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let file_name = format!("downloaded_{}", name.replace(['/', '\\'], "_"));
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    debug!("Saved copy to {}", path.display());
    Ok(())
}
