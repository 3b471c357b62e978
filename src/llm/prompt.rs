//! Prompt text for the three model conversations.

use crate::llm::ChatMessage;
use crate::report::Report;

pub const SUMMARY_SYSTEM: &str = "You are a friendly, supportive genetics educator writing for a teenager or adult \
with no formal genetics background. You are given structured genetic trait data in JSON.\n\n\
Your job:\n\
1. Start with a short 'Big Picture' overview (1-2 short paragraphs) summarizing overall themes.\n\
2. Then write a 'Highlights by Category' section. For any categories that appear in the JSON \
(e.g., Nutrition, Fitness, Sleep, Neurobehavior, Sensory, Appearance), briefly describe 1-3 key points \
in simple language. This should still be in paragraph form, not bullet points.\n\
3. End with a 'Remember' section emphasizing that genetics is only one factor and that environment, \
lifestyle, mental health, and medical care matter a lot.\n\n\
Important rules:\n\
- Do NOT give medical advice.\n\
- Do NOT diagnose or suggest treatments.\n\
- Do NOT mention specific SNP IDs or genotypes; focus on the meaning.\n\
- Keep the tone warm, encouraging, and non-alarming.\n\
- Write in clear paragraphs, no markdown symbols like ** or bullet points.\n";

pub const PLAN_SYSTEM: &str = "You are a careful genetics-informed lifestyle coach. \
Given a structured trait report and an AI summary, create a short, non-medical lifestyle plan. \
Organize the plan into sections such as Sleep, Focus & Learning, Movement & Recovery, Caffeine & Stimulants, \
and Everyday Habits. For each section, list 3-5 gentle, practical ideas that could be helpful for someone with these traits. \
Use tentative language (may, might, could) and remind the reader that this is not medical advice.";

pub const CHAT_SYSTEM: &str = "You are a genetics informed lifestyle coach. \
You receive a JSON report of traits and a short AI summary. \
You may discuss possible lifestyle ideas related to sleep, focus, caffeine, training, and general wellness. \
You must avoid medical advice, diagnosis, or treatment recommendations. \
Use careful language like may, might, and could, and encourage the user to talk with a clinician \
or genetic counselor for any medical questions.";

pub fn summary_messages(report: &Report) -> serde_json::Result<Vec<ChatMessage>> {
    let report_json = report.to_json()?;
    let user = format!(
        "Here is the JSON report describing this person's interpreted genetic traits:\n\n\
         {}\n\n\
         Please follow the instructions in the system message and write the summary accordingly.",
        report_json
    );

    Ok(vec![ChatMessage::system(SUMMARY_SYSTEM), ChatMessage::user(user)])
}

pub fn plan_messages(report: &Report, summary: Option<&str>) -> serde_json::Result<Vec<ChatMessage>> {
    let context = format!(
        "Trait JSON:\n{}\n\nAI summary of traits:\n{}",
        report.to_json()?,
        summary.unwrap_or_default()
    );

    Ok(vec![ChatMessage::system(PLAN_SYSTEM), ChatMessage::user(context)])
}

/// System prompt, report context, earlier turns, then the new question.
pub fn chat_messages(
    report: &Report,
    summary: Option<&str>,
    history: &[ChatMessage],
    question: &str,
) -> serde_json::Result<Vec<ChatMessage>> {
    let context = format!(
        "Trait JSON:\n{}\n\nSummary:\n{}",
        report.to_json()?,
        summary.unwrap_or_default()
    );

    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(CHAT_SYSTEM));
    messages.push(ChatMessage::user(context));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(question));
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::report::build_report;
    use crate::types::MatchedTrait;

    fn report() -> Report {
        build_report(vec![MatchedTrait {
            trait_id: "caf1".to_string(),
            trait_name: "Caffeine Metabolism".to_string(),
            category: "Nutrition".to_string(),
            rsid: "rs762551".to_string(),
            gene: "CYP1A2".to_string(),
            user_genotype: "AA".to_string(),
            effect_label: "Fast metabolizer".to_string(),
            effect_level: "HIGH".to_string(),
            explanation: "...".to_string(),
            evidence_strength: "Strong".to_string(),
        }])
    }

    #[test]
    fn test_summary_prompt_embeds_report_json() {
        let messages = summary_messages(&report()).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Big Picture"));
        assert!(messages[0].content.contains("Remember"));
        assert!(messages[1].content.contains("\"num_traits_found\": 1"));
        assert!(messages[1].content.contains("Caffeine Metabolism"));
    }

    #[test]
    fn test_chat_prompt_orders_history_before_question() {
        let history = vec![
            ChatMessage::user("Do I sleep deeply?"),
            ChatMessage::assistant("You might."),
        ];
        let messages = chat_messages(&report(), Some("summary"), &history, "And coffee?").unwrap();

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[1].content.ends_with("Summary:\nsummary"));
        assert_eq!(messages[3].role, Role::Assistant);
        assert_eq!(messages[4].content, "And coffee?");
    }

    #[test]
    fn test_plan_prompt_tolerates_missing_summary() {
        let messages = plan_messages(&report(), None).unwrap();
        assert!(messages[1].content.ends_with("AI summary of traits:\n"));
    }
}
