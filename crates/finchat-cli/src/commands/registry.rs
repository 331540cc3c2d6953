//! Registry commands.

use crate::cli::{DownloadTarget, RegistryAction};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use finchat_chat::Answer;
use finchat_domain::CompletionProvider;
use finchat_registry::{export, BrregClient, DownloadFormat, EntityDirectory, EntityRecord, RegistryChat};
use std::fmt::Display;
use std::path::Path;

/// Execute a registry action that needs no completion service.
///
/// `Ask` and `Repl` are dispatched by the caller, which owns the provider.
pub async fn execute_lookup(action: RegistryAction, client: &BrregClient, formatter: &Formatter) -> Result<()> {
    match action {
        RegistryAction::Search { name, csv } => {
            let response = client.search_entities(&name).await?;
            let records = EntityRecord::flatten(&response);
            println!("{}", formatter.records_table(&records));

            if let Some(path) = csv {
                export::write_csv(&records, &path).await?;
                println!(
                    "{}",
                    formatter.success(&format!("Saved {} entities to {}", records.len(), path.display()))
                );
            }
        }
        RegistryAction::Entity { orgnr, roles } => {
            let value = if roles {
                client.fetch_roles_for_entity(&orgnr).await?
            } else {
                client.fetch_entity(&orgnr).await?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        RegistryAction::Download { target, format, output } => {
            let bytes = download(client, target, format.into()).await?;
            write_bytes(&output, &bytes).await?;
            println!(
                "{}",
                formatter.success(&format!("Wrote {} bytes to {}", bytes.len(), output.display()))
            );
        }
        RegistryAction::Ask { .. } | RegistryAction::Repl { .. } => {
            return Err(CliError::InvalidInput(
                "registry ask and repl need a completion service".to_string(),
            ));
        }
    }
    Ok(())
}

/// Execute the registry ask command.
pub async fn execute_registry_ask<D, C>(
    entity: &str,
    question: &str,
    chat: &mut RegistryChat<D, C>,
    formatter: &Formatter,
) -> Result<()>
where
    D: EntityDirectory,
    C: CompletionProvider,
    C::Error: Display,
{
    let answer = chat.answer(entity, question).await?;
    print!("{}", render_registry_answer(formatter, question, &answer));
    Ok(())
}

/// The exchange, as the registry chat shows it.
pub fn render_registry_answer(formatter: &Formatter, question: &str, answer: &Answer) -> String {
    formatter.exchange(question, answer)
}

async fn download(client: &BrregClient, target: DownloadTarget, format: DownloadFormat) -> Result<Vec<u8>> {
    let bytes = match target {
        DownloadTarget::Entities => client.download_entities(format).await?,
        DownloadTarget::SubEntities => client.download_sub_entities(format).await?,
        DownloadTarget::Parties => client.download_political_parties_csv().await?,
        DownloadTarget::NonProfits => client.download_non_profit_orgs_csv().await?,
    };
    Ok(bytes)
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}
