/// Sent on the user's behalf once a document has been extracted.
pub const AUTO_ANALYZE_PROMPT: &str = "Analyze the uploaded report.";

/// Builds the analyze prompt, grounding the question in extracted document
/// text when there is any.
pub fn compose_prompt(context: Option<&str>, question: &str) -> String {
    match context.filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "Given the following uploaded data:\n{}\n\nUser question: {}",
            context, question
        ),
        None => question.to_string(),
    }
}
