//! Per-user context for an interactive report session.

use crate::llm::{self, ChatMessage, ChatModel, LlmError};
use crate::report::Report;

/// A report together with everything the model has produced for it so far.
///
/// Chat turns are recorded only once the model has answered, so a failed
/// call leaves the history untouched.
#[derive(Debug, Clone)]
pub struct ReportSession {
    report: Report,
    summary: Option<String>,
    plan: Option<String>,
    history: Vec<ChatMessage>,
}

impl ReportSession {
    pub fn new(report: Report) -> Self {
        Self {
            report,
            summary: None,
            plan: None,
            history: Vec::new(),
        }
    }

    /// Start a session with a summary produced elsewhere
    pub fn with_summary(report: Report, summary: Option<String>) -> Self {
        Self {
            summary,
            ..Self::new(report)
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Regenerate the summary. The previous one is kept on failure.
    pub fn generate_summary(&mut self, model: &dyn ChatModel) -> Result<&str, LlmError> {
        let summary = llm::summarize(model, &self.report)?;
        Ok(self.summary.insert(summary).as_str())
    }

    pub fn generate_plan(&mut self, model: &dyn ChatModel) -> Result<&str, LlmError> {
        let plan = llm::lifestyle_plan(model, &self.report, self.summary.as_deref())?;
        Ok(self.plan.insert(plan).as_str())
    }

    /// Ask a follow-up question with the conversation so far as context.
    pub fn ask(&mut self, model: &dyn ChatModel, question: &str) -> Result<String, LlmError> {
        let answer = llm::answer_question(
            model,
            &self.report,
            self.summary.as_deref(),
            &self.history,
            question,
        )?;

        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }

    /// Forget earlier chat turns; the summary and plan are kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
