//! Output formatting for the CLI.

use colored::*;
use finchat_chat::{format_exchange, Answer, Transcript};
use finchat_registry::{EntityRecord, COLUMNS};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Columns shown in the terminal table; the CSV export carries all of them.
const TABLE_COLUMNS: [usize; 5] = [0, 1, 2, 6, 7];

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Banner listing the reports questions can be asked about.
    pub fn report_banner(&self, names: &[String]) -> String {
        let mut out = String::from("The reports you can ask questions about are the following:");
        for name in names {
            out.push_str("\n - ");
            out.push_str(name);
        }
        out
    }

    /// Plain list of report names.
    pub fn report_list(&self, names: &[String]) -> String {
        if names.is_empty() {
            return self.colorize("No reports found.", "yellow");
        }
        names.join("\n")
    }

    /// Progress line for a report fetched while answering.
    pub fn extracted(&self, name: &str) -> String {
        self.colorize(&format!("Extracted text from {}...", name), "cyan")
    }

    /// One question and its answer, as the transcript shows them,
    /// including the blank line that closes the block.
    pub fn exchange(&self, question: &str, answer: &Answer) -> String {
        let text = format_exchange(question, &answer.text);
        if answer.is_error() {
            self.colorize(&text, "red")
        } else {
            text
        }
    }

    /// Every exchange of the session, in order.
    pub fn transcript(&self, transcript: &Transcript) -> String {
        if transcript.is_empty() {
            return format!("{}
", self.info("No questions asked yet."));
        }
        transcript.to_string()
    }

    /// Registry search results as a table.
    pub fn records_table(&self, records: &[EntityRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No entities found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(TABLE_COLUMNS.map(|i| COLUMNS[i]));

        for record in records {
            let values = record.values();
            builder.push_record(TABLE_COLUMNS.map(|i| values[i]));
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}
