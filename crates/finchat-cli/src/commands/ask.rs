//! Report chat commands.

use crate::cli::AskArgs;
use crate::error::Result;
use crate::output::Formatter;
use finchat_chat::{Answer, ReportChat};
use finchat_domain::{CompletionProvider, DocumentStore, TextExtractor};
use finchat_store::StoreError;
use std::fmt::Display;

/// Execute the list command.
pub async fn execute_list<S>(store: &S, formatter: &Formatter) -> Result<()>
where
    S: DocumentStore<Error = StoreError>,
{
    let names = store.list_names().await?;
    println!("{}", formatter.report_list(&names));
    Ok(())
}

/// Execute the ask command.
pub async fn execute_ask<S, X, C>(
    args: AskArgs,
    chat: &mut ReportChat<S, X, C>,
    formatter: &Formatter,
) -> Result<()>
where
    S: DocumentStore,
    X: TextExtractor,
    C: CompletionProvider,
    S::Error: Display,
    X::Error: Display,
    C::Error: Display,
{
    let question = args.question.join(" ");
    let answer = chat.answer_question(&args.reports, &question).await?;
    print!("{}", render_answer(formatter, &question, &answer));
    Ok(())
}

/// Progress lines for newly fetched reports, the analysis notice, then the
/// exchange.
pub fn render_answer(formatter: &Formatter, question: &str, answer: &Answer) -> String {
    let mut out = String::new();
    for name in &answer.newly_fetched {
        out.push_str(&formatter.extracted(name));
        out.push('\n');
    }
    out.push_str(&formatter.info("Analyzing reports..."));
    out.push('\n');
    out.push_str(&formatter.exchange(question, answer));
    out
}
