//! Report narration and Q&A over the computed analytics.

use anyhow::{Context, Result};
use ledgerlens_core::Report;

use crate::{ChatTurn, Provider};

const ADVISOR_SYSTEM: &str =
    "You are a personal financial advisor analyzing a client's bank statement. \
     Be specific with numbers, percentages, and actionable advice. \
     Tone: friendly but professional, like a financial advisor talking to a friend.";

/// Generates human-readable financial insights from a [`Report`]
pub struct InsightsAgent {
    provider: Box<dyn Provider>,
}

impl InsightsAgent {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Narrate the full report as markdown
    pub async fn generate_insights(&self, report: &Report) -> Result<String> {
        let report_json = serde_json::to_string_pretty(report).context("serialize report")?;

        let prompt = format!(
            "Here is the financial data:\n\n{report_json}\n\n\
             Provide a comprehensive financial analysis in markdown format with these sections:\n\n\
             1. **Executive Summary** (2-3 sentences overview)\n\
             2. **Key Insights** (3-5 bullet points of most important findings)\n\
             3. **Spending Breakdown** (analysis of category spending)\n\
             4. **Recurring Payments** (identify subscriptions and regular expenses)\n\
             5. **Unusual Activity** (flag any concerning transactions)\n\
             6. **Recommendations** (3-5 actionable suggestions to improve financial health)\n\
             7. **Financial Forecast** (predict next month based on current patterns)"
        );

        self.provider
            .complete(ADVISOR_SYSTEM, &[ChatTurn::user(prompt)])
            .await
    }

    /// Answer one question grounded in the report
    pub async fn answer_question(&self, question: &str, report: &Report) -> Result<String> {
        let system = advisor_system_with_report(report)?;
        self.provider
            .complete(&system, &[ChatTurn::user(question)])
            .await
    }
}

/// Advisor system prompt with the report data embedded; also used by the chat
/// TUI, which manages its own conversation turns.
pub fn advisor_system_with_report(report: &Report) -> Result<String> {
    let report_json = serde_json::to_string_pretty(report).context("serialize report")?;
    Ok(format!(
        "{ADVISOR_SYSTEM}\n\n\
         You have access to the following financial data:\n\n{report_json}\n\n\
         Answer based on this data. Include numbers and percentages where relevant."
    ))
}
