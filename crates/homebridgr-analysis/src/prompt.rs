//! Prompt construction for caption analysis.

/// Render a caption into the instruction prompt sent to the model.
///
/// Pure and deterministic: the same caption always yields the same prompt.
/// The caption is embedded verbatim (trimmed) as the final paragraph.
pub fn build_prompt(caption: &str) -> String {
    [
        "You help by clarifying student social media captions.",
        "Identify slang, acronyms, cultural references, or locations that could confuse someone who is not of the culture or area.",
        "List each confusing term alongside a brief 1-2 sentence explanation that references the caption context.",
        "Respond with strict JSON matching this schema:",
        r#"{ "terms": [ { "term": string, "explanation": string } ] }"#,
        "Provide between 2 and 7 terms when possible. If no confusing terms exist, explain why in one entry.",
        "Caption:",
        caption.trim(),
    ]
    .join("\n\n")
}
