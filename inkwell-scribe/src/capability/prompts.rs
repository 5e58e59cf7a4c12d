//! Prompt templates sent to the vision/language provider

use super::SummaryMode;

pub const TRANSCRIBE_INSTRUCTION: &str = "Please transcribe this text. Correct any spelling mistakes and grammatical errors. Do not include any introductions, explanations, or headers. Only output the corrected text.";

/// Page text when the provider reads nothing on the image
pub const NO_TEXT_DETECTED: &str = "No text detected";

pub const TITLE_SYSTEM: &str = "You are a helpful assistant that generates concise, descriptive titles for journal entries. Keep titles under 50 characters.";

pub const INSIGHT_SYSTEM: &str = "You are an insightful AI that analyzes journal entries to provide helpful insights. Be concise and specific. Format your response as a bullet-pointed list, with each point on a new line starting with •. Do not use markdown formatting.";

/// Title used when the provider answers with nothing
pub const UNTITLED: &str = "Untitled Entry";

/// Sampling settings and messages for one summarization request
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPrompt {
    pub system: &'static str,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Build the request for `mode` over `text`
pub fn summary_prompt(text: &str, mode: SummaryMode) -> SummaryPrompt {
    match mode {
        SummaryMode::Title => SummaryPrompt {
            system: TITLE_SYSTEM,
            user: format!("Generate a title for this journal entry:\n\n{}", text),
            max_tokens: 50,
            temperature: 0.7,
        },
        _ => SummaryPrompt {
            system: INSIGHT_SYSTEM,
            user: format!("{}\n\nJournal entries:\n{}", insight_instruction(mode), text),
            max_tokens: 250,
            temperature: 0.7,
        },
    }
}

fn insight_instruction(mode: SummaryMode) -> &'static str {
    match mode {
        SummaryMode::Themes => "Analyze these journal entries and identify 3-5 recurring themes or patterns. List each point on a new line starting with a bullet point (•). Do not use markdown formatting.",
        SummaryMode::Focus => "Based on these journal entries, suggest 3-4 areas or activities the writer should focus on for personal growth. List each point on a new line starting with a bullet point (•). Do not use markdown formatting.",
        SummaryMode::Mood => "Analyze the emotional tone of these entries and provide 3-4 insights about the writer's emotional patterns. List each point on a new line starting with a bullet point (•). Do not use markdown formatting.",
        SummaryMode::Goals => "Extract and analyze any mentioned goals or aspirations, and provide 3-4 suggestions for achieving them. List each point on a new line starting with a bullet point (•). Do not use markdown formatting.",
        SummaryMode::Title => "Generate a title for this journal entry.",
    }
}

/// Normalize a generated title: trim, strip wrapping quotes, fall back to [`UNTITLED`]
pub fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();

    if unquoted.is_empty() {
        UNTITLED.to_string()
    } else {
        unquoted.to_string()
    }
}
