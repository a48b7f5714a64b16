//! Search query composition
//!
//! Turns a [`MoodInput`] into 1..=3 catalog search phrases, primary first.
//! When a text generator is configured it is asked for phrases; any failure
//! or unusable answer falls back to [`template_queries`], which is pure.

use crate::llm::TextGenerator;
use moodtune_common::{MoodInput, TimeOfDay, Weather};
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on queries per request
pub const MAX_QUERIES: usize = 3;

const SYSTEM_PROMPT: &str = "You suggest search phrases for a music streaming catalog. \
Reply with 2 or 3 short English search phrases, one per line, at most 6 words each. \
No numbering, no quotes, no commentary.";

/// Longer lines are prose, not search phrases
const MAX_PHRASE_WORDS: usize = 8;

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’', '「', '」'];

pub struct QueryComposer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl QueryComposer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Templates only
    pub fn templates_only() -> Self {
        Self { generator: None }
    }

    /// Ordered search phrases for a mood, never empty
    pub async fn compose(&self, mood: &MoodInput) -> Vec<String> {
        let Some(generator) = &self.generator else {
            return template_queries(mood.genre(), mood.weather(), mood.time_of_day());
        };

        let user = format!(
            "Genre: {}\nWeather: {}\nTime of day: {}\nSuggest search phrases for songs matching this mood.",
            mood.genre(),
            mood.weather(),
            mood.time_of_day()
        );

        match generator.complete(SYSTEM_PROMPT, &user).await {
            Ok(text) => {
                let queries = parse_generated_queries(&text);
                if queries.is_empty() {
                    warn!("Text generation returned no usable phrases, using templates");
                    template_queries(mood.genre(), mood.weather(), mood.time_of_day())
                } else {
                    debug!(?queries, "Generated search queries");
                    queries
                }
            }
            Err(e) => {
                warn!(error = %e, "Text generation failed, using templates");
                template_queries(mood.genre(), mood.weather(), mood.time_of_day())
            }
        }
    }
}

/// Deterministic search phrases for a mood
pub fn template_queries(genre: &str, weather: Weather, time_of_day: TimeOfDay) -> Vec<String> {
    let genre = genre.trim();
    let keyword = time_of_day.keyword();
    let candidates = [
        format!("{} {} {} music", genre, weather, keyword),
        format!("{} {} songs", genre, weather.mood_word()),
        format!("{} {} playlist", genre, keyword),
    ];
    dedup_capped(candidates.into_iter())
}

/// Extract search phrases from generated text
///
/// Accepts a JSON array of strings or one phrase per line. Numbering, bullets
/// and quote characters are stripped. Empty lines, lead-in lines ending in
/// `:` and lines longer than [`MAX_PHRASE_WORDS`] words are dropped.
pub fn parse_generated_queries(text: &str) -> Vec<String> {
    let trimmed = text.trim();

    let from_json = trimmed
        .find('[')
        .zip(trimmed.rfind(']'))
        .filter(|(start, end)| start < end)
        .and_then(|(start, end)| serde_json::from_str::<Vec<String>>(&trimmed[start..=end]).ok());

    let raw: Vec<String> = match from_json {
        Some(items) => items,
        None => trimmed
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .map(str::to_string)
            .collect(),
    };

    dedup_capped(
        raw.iter()
            .map(|line| clean_phrase(line))
            .filter(|phrase| is_search_phrase(phrase)),
    )
}

fn is_search_phrase(phrase: &str) -> bool {
    !phrase.ends_with(':') && phrase.split_whitespace().count() <= MAX_PHRASE_WORDS
}

fn clean_phrase(line: &str) -> String {
    let mut phrase = line.trim();

    phrase = phrase.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '·'));
    let digits = phrase.len() - phrase.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let rest = &phrase[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            phrase = stripped;
        }
    }

    let without_quotes: String = phrase.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    without_quotes
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, ',' | ';'))
        .to_string()
}

fn dedup_capped(phrases: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_QUERIES);
    for phrase in phrases {
        if out.len() == MAX_QUERIES {
            break;
        }
        if phrase.is_empty() || out.iter().any(|q| q.eq_ignore_ascii_case(&phrase)) {
            continue;
        }
        out.push(phrase);
    }
    out
}
