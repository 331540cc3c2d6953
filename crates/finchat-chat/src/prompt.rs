//! Prompt assembly for multi-report questions

use finchat_domain::SessionState;

const PREAMBLE: &str = "The following are summaries of annual reports:\n\n";
const CLOSING: &str = "Based on the above reports, please answer the following question:\n";

/// Builds the user prompt from a set of reports and a question
///
/// Reports appear in the order they were added, numbered from 1. Texts are
/// included in full; size limits are the caller's business.
///
/// # Examples
///
/// ```
/// use finchat_chat::PromptBuilder;
///
/// let prompt = PromptBuilder::new("What was the revenue?")
///     .with_report("acme-2020.pdf", "Revenue was 10")
///     .build();
/// assert!(prompt.contains("Report 1 (acme-2020.pdf):\nRevenue was 10\n\n"));
/// ```
pub struct PromptBuilder<'a> {
    question: &'a str,
    reports: Vec<(&'a str, &'a str)>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder with no reports
    pub fn new(question: &'a str) -> Self {
        Self {
            question,
            reports: Vec::new(),
        }
    }

    /// Builder over every session report, in fetch order
    pub fn from_session(session: &'a SessionState, question: &'a str) -> Self {
        Self {
            question,
            reports: session
                .reports()
                .map(|(name, text)| (name, text.as_str()))
                .collect(),
        }
    }

    /// Append one report
    pub fn with_report(mut self, name: &'a str, text: &'a str) -> Self {
        self.reports.push((name, text));
        self
    }

    /// Number of reports the prompt will contain
    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let body: usize = self.reports.iter().map(|(name, text)| name.len() + text.len() + 32).sum();
        let mut prompt =
            String::with_capacity(PREAMBLE.len() + body + CLOSING.len() + self.question.len());

        prompt.push_str(PREAMBLE);
        for (index, (name, text)) in self.reports.iter().enumerate() {
            prompt.push_str(&format!("Report {} ({}):\n{}\n\n", index + 1, name, text));
        }
        prompt.push_str(CLOSING);
        prompt.push_str(self.question);

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchat_domain::ReportText;

    #[test]
    fn test_exact_layout() {
        let prompt = PromptBuilder::new("Compare revenue")
            .with_report("a-2020.pdf", "ten")
            .with_report("a-2021.pdf", "twelve")
            .build();
        assert_eq!(
            prompt,
            "The following are summaries of annual reports:\n\n\
             Report 1 (a-2020.pdf):\nten\n\n\
             Report 2 (a-2021.pdf):\ntwelve\n\n\
             Based on the above reports, please answer the following question:\nCompare revenue"
        );
    }

    #[test]
    fn test_no_reports() {
        let prompt = PromptBuilder::new("Anything?").build();
        assert_eq!(
            prompt,
            "The following are summaries of annual reports:\n\n\
             Based on the above reports, please answer the following question:\nAnything?"
        );
    }

    #[test]
    fn test_from_session_keeps_fetch_order() {
        let mut session = SessionState::new();
        session.insert("z-2021.pdf", ReportText::new("later name, fetched first"));
        session.insert("a-2020.pdf", ReportText::new("fetched second"));

        let builder = PromptBuilder::from_session(&session, "q");
        assert_eq!(builder.report_count(), 2);

        let prompt = builder.build();
        let first = prompt.find("Report 1 (z-2021.pdf):").unwrap();
        let second = prompt.find("Report 2 (a-2020.pdf):").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_text_is_not_truncated() {
        let long = "x".repeat(100_000);
        let prompt = PromptBuilder::new("q").with_report("big.pdf", &long).build();
        assert!(prompt.contains(&long));
    }
}
