//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::commands::{render_answer, render_registry_answer};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use finchat_chat::{ReportChat, Transcript};
use finchat_domain::{CompletionProvider, DocumentStore, TextExtractor};
use finchat_registry::{EntityDirectory, RegistryChat};
use rustyline::config::Config as EditorConfig;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fmt::Display;
use std::path::PathBuf;

/// REPL command type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Leave the REPL
    Exit,
    /// Show help
    Help,
    /// List store reports
    List,
    /// List reports cached in this session
    Session,
    /// Show every question and answer so far
    Transcript,
    /// Reload the store catalog
    Refresh,
    /// Set the report identifiers used for later questions
    Use(String),
    /// Switch the registry entity
    Entity(String),
    /// Anything else is a question
    Question(String),
}

/// Parse a REPL line. `None` for blank input.
pub fn parse_repl_line(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match (head, rest.is_empty()) {
        ("exit" | "quit" | "q", true) => ReplCommand::Exit,
        ("help" | "?", true) => ReplCommand::Help,
        ("list", true) => ReplCommand::List,
        ("session", true) => ReplCommand::Session,
        ("transcript", true) => ReplCommand::Transcript,
        ("refresh", true) => ReplCommand::Refresh,
        ("use", false) => ReplCommand::Use(rest.to_string()),
        ("entity", false) => ReplCommand::Entity(rest.to_string()),
        _ => ReplCommand::Question(line.to_string()),
    };
    Some(command)
}

/// Run the interactive report chat.
pub async fn run_repl<S, X, C>(
    chat: &mut ReportChat<S, X, C>,
    history_size: usize,
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
    match chat.available_reports().await {
        Ok(names) => println!("{}", formatter.report_banner(names)),
        Err(e) => eprintln!("{}", formatter.error(&e.user_message())),
    }
    println!();
    println!(
        "{}",
        formatter.info("Type 'use <Company Year, ...>' to pick reports, then ask questions. 'help' for commands.")
    );
    println!();

    let mut editor = new_editor(history_size)?;
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut reports = String::new();
    let mut transcript = Transcript::new();

    loop {
        let prompt = if reports.is_empty() {
            "finchat> ".to_string()
        } else {
            format!("finchat [{}]> ", reports)
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let Some(command) = parse_repl_line(&line) else {
                    continue;
                };
                editor.add_history_entry(line.trim()).ok();

                match command {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => print_help(formatter),
                    ReplCommand::List => match chat.available_reports().await {
                        Ok(names) => println!("{}", formatter.report_list(names)),
                        Err(e) => eprintln!("{}", formatter.error(&e.user_message())),
                    },
                    ReplCommand::Session => {
                        println!("{}", formatter.report_list(chat.session().names()));
                    }
                    ReplCommand::Transcript => print!("{}", formatter.transcript(&transcript)),
                    ReplCommand::Refresh => match chat.reload_catalog().await {
                        Ok(names) => {
                            println!("{}", formatter.success(&format!("{} reports available", names.len())))
                        }
                        Err(e) => eprintln!("{}", formatter.error(&e.user_message())),
                    },
                    ReplCommand::Use(list) => {
                        println!("{}", formatter.info(&format!("Using reports: {}", list)));
                        reports = list;
                    }
                    ReplCommand::Entity(_) => {
                        eprintln!("{}", formatter.warning("'entity' is a registry command; try 'use'"));
                    }
                    ReplCommand::Question(question) => {
                        match chat.answer_question(&reports, &question).await {
                            Ok(answer) => {
                                print!("{}", render_answer(formatter, &question, &answer));
                                transcript.push(&question, &answer.text);
                            }
                            Err(e) => eprintln!("{}", formatter.error(&e.user_message())),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();
    tracing::debug!("Session ended after {} questions", transcript.len());

    Ok(())
}

/// Run the interactive registry chat.
pub async fn run_registry_repl<D, C>(
    chat: &mut RegistryChat<D, C>,
    entity: Option<String>,
    history_size: usize,
    formatter: &Formatter,
) -> Result<()>
where
    D: EntityDirectory,
    C: CompletionProvider,
    C::Error: Display,
{
    println!(
        "{}",
        formatter.info("Registry chat - 'entity <name>' picks an entity, other lines are questions, 'exit' to quit")
    );
    println!();

    let mut editor = new_editor(history_size)?;
    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    let mut entity = entity.unwrap_or_default();
    let mut transcript = Transcript::new();

    loop {
        let prompt = if entity.is_empty() {
            "brreg> ".to_string()
        } else {
            format!("brreg [{}]> ", entity)
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let Some(command) = parse_repl_line(&line) else {
                    continue;
                };
                editor.add_history_entry(line.trim()).ok();

                match command {
                    ReplCommand::Exit => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    ReplCommand::Help => print_registry_help(formatter),
                    ReplCommand::Entity(name) => {
                        println!("{}", formatter.info(&format!("Entity: {}", name)));
                        entity = name;
                    }
                    ReplCommand::Transcript => print!("{}", formatter.transcript(&transcript)),
                    ReplCommand::Question(question) => match chat.answer(&entity, &question).await {
                        Ok(answer) => {
                            print!("{}", render_registry_answer(formatter, &question, &answer));
                            transcript.push(&question, &answer.text);
                            if let Some(current) = chat.current_entity() {
                                entity = current.to_string();
                            }
                        }
                        Err(e) => eprintln!("{}", formatter.error(&e.user_message())),
                    },
                    other => {
                        eprintln!("{}", formatter.warning(&format!("Not available in registry chat: {:?}", other)));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

fn new_editor(history_size: usize) -> Result<DefaultEditor> {
    let config = EditorConfig::builder()
        .max_history_size(history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    DefaultEditor::with_config(config).map_err(|e| {
        CliError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to initialize editor: {}", e),
        ))
    })
}

fn get_history_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    let finchat_dir = home.join(".finchat");
    std::fs::create_dir_all(&finchat_dir)?;
    Ok(finchat_dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  use <Company Year, ...>   - Pick the reports to ask about");
    println!("  list                      - List reports in the store");
    println!("  session                   - List reports read so far");
    println!("  transcript                - Show the questions and answers so far");
    println!("  refresh                   - Reload the report list");
    println!("  <question>                - Ask about the picked reports");
    println!("  help, ?                   - Show this help");
    println!("  exit, quit, q             - Exit REPL");
    println!();
}

fn print_registry_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  entity <name>             - Pick the entity to ask about");
    println!("  <question>                - Ask about the entity");
    println!("  ... download ... csv ...  - Export the entity's records to CSV");
    println!("  transcript                - Show the questions and answers so far");
    println!("  help, ?                   - Show this help");
    println!("  exit, quit, q             - Exit REPL");
    println!();
}
